//! Attempts driven through [`ActorHandle`] with paused tokio time.
//!
//! Each test spawns one actor queue over a tiny cookbook, submits
//! use-item actions, answers confirmation dialogs from the outside, and
//! checks the actor's state with a snapshot afterwards.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::sync::Arc;
use std::time::Duration;

use artisan_core::{ActorHandle, ActorState, PipelineError, Reply, ServerConfig, Services};
use artisan_rules::{
    CraftError, Crafter, CraftingEngine, NoHooks, Notice, SkillCurve, StaticWorldLookup,
    WeenieError,
};
use artisan_types::{
    CombatMode, EntityId, IntKey, ItemType, MaterialType, Placement, PropertyStore, Recipe,
    RecipeBranch, SALVAGE_TYPE_CRAFTING, Skill, SkillAdvancementClass, Weenie, WeenieType,
    WorldObject,
};
use tokio::sync::broadcast;
use tokio::time::Instant;

const ACTOR: EntityId = EntityId(0x5000_0001);
const TOOL: EntityId = EntityId(70);
const GEM: EntityId = EntityId(71);
const TOOL_CLASS: u32 = 100;
const GEM_CLASS: u32 = 300;
const CUT_GEM_CLASS: u32 = 7_000;
const FIRST_GUID: u32 = 0x8000_0000;

// =============================================================================
// Fixtures
// =============================================================================

struct FixedCurve(f64);

impl SkillCurve for FixedCurve {
    fn chance(&self, _skill: u32, _difficulty: u32) -> f64 {
        self.0
    }
}

fn held(id: EntityId, class: u32, name: &str) -> WorldObject {
    let mut object = WorldObject::new(id, class, ItemType::Misc, WeenieType::Generic, name);
    object.placement = Placement::Inventory { owner: ACTOR };
    object
}

fn carving_recipe() -> Recipe {
    Recipe {
        id: 5_000,
        skill: Skill::Cooking.id(),
        difficulty: 50,
        salvage_type: SALVAGE_TYPE_CRAFTING,
        success: RecipeBranch {
            create_item: CUT_GEM_CLASS,
            create_amount: 1,
            message: String::from("You carve the gem."),
            destroy_target_chance: 1.0,
            destroy_target_amount: 1,
            ..RecipeBranch::default()
        },
        failure: RecipeBranch::default(),
        requirements: Vec::new(),
        modifications: Vec::new(),
    }
}

fn lookup() -> StaticWorldLookup {
    StaticWorldLookup::new()
        .with_recipe(TOOL_CLASS, GEM_CLASS, carving_recipe())
        .with_weenie(Weenie {
            class_id: CUT_GEM_CLASS,
            name: String::from("Cut Gem"),
            item_type: ItemType::Gem,
            weenie_type: WeenieType::Generic,
            properties: PropertyStore::new(),
        })
}

fn carver() -> Crafter {
    Crafter::new(ACTOR, "Aldric").with_skill(Skill::Cooking, SkillAdvancementClass::Trained, 200)
}

fn config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.world.seed = Some(7);
    config.world.first_dynamic_guid = FIRST_GUID;
    config
}

struct Harness {
    handle: ActorHandle,
    notices: broadcast::Receiver<Notice>,
}

fn spawn_with(config: &ServerConfig, crafter: Crafter, items: Vec<WorldObject>) -> Harness {
    let engine = CraftingEngine::new(config.crafting.clone()).with_curve(Box::new(FixedCurve(1.0)));
    let services = Services::new(config, Arc::new(lookup())).with_engine(engine);
    let notices = services.notifier.subscribe();
    let (handle, _task) = ActorHandle::spawn(ActorState::new(crafter, items), services, Box::new(NoHooks));
    Harness { handle, notices }
}

fn spawn() -> Harness {
    spawn_with(
        &config(),
        carver(),
        vec![held(TOOL, TOOL_CLASS, "Carving Tool"), held(GEM, GEM_CLASS, "Uncut Gem")],
    )
}

/// Wait for the confirmation prompt addressed to the actor.
async fn next_prompt(notices: &mut broadcast::Receiver<Notice>) -> String {
    loop {
        match notices.recv().await {
            Ok(Notice::Confirm { to, text }) if to == ACTOR => return text,
            Ok(_) => {}
            Err(error) => panic!("notice stream ended: {error}"),
        }
    }
}

fn drain(notices: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut seen = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        seen.push(notice);
    }
    seen
}

// =============================================================================
// Confirmation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn accepted_prompt_resolves_the_attempt() {
    let Harness {
        handle,
        mut notices,
    } = spawn();
    let started = Instant::now();

    let worker = handle.clone();
    let attempt = tokio::spawn(async move { worker.use_object(TOOL, GEM, false).await });

    let prompt = next_prompt(&mut notices).await;
    assert!(prompt.contains("100 percent chance"));
    assert!(handle.is_busy());
    assert!(started.elapsed() >= Duration::from_millis(1_500));
    assert!(handle.confirm(Reply::Accept));

    let outcome = attempt.await.unwrap().unwrap();
    assert!(outcome.success);
    assert!(!handle.is_busy());
    assert_eq!(outcome.destroyed, vec![GEM]);

    let state = handle.snapshot().await.unwrap();
    assert!(!state.objects.contains_key(&GEM));
    assert!(state.objects.contains_key(&TOOL));
    let created = outcome.created.unwrap();
    assert_eq!(created.id, EntityId(FIRST_GUID));
    assert_eq!(state.objects.get(&created.id).map(WorldObject::name), Some("Cut Gem"));
}

#[tokio::test(start_paused = true)]
async fn declined_prompt_changes_nothing() {
    let Harness {
        handle,
        mut notices,
    } = spawn();
    let before = handle.snapshot().await.unwrap();

    let worker = handle.clone();
    let attempt = tokio::spawn(async move { worker.use_object(TOOL, GEM, false).await });
    next_prompt(&mut notices).await;
    assert!(handle.confirm(Reply::Decline));

    assert_eq!(
        attempt.await.unwrap(),
        Err(PipelineError::Declined { actor: ACTOR })
    );
    assert_eq!(handle.snapshot().await.unwrap(), before);
    assert!(!handle.is_busy());
}

#[tokio::test(start_paused = true)]
async fn unanswered_prompt_times_out_untouched() {
    let mut config = config();
    config.pipeline.confirmation_timeout_ms = 2_000;
    let Harness { handle, .. } = spawn_with(
        &config,
        carver(),
        vec![held(TOOL, TOOL_CLASS, "Carving Tool"), held(GEM, GEM_CLASS, "Uncut Gem")],
    );
    let before = handle.snapshot().await.unwrap();

    let result = handle.use_object(TOOL, GEM, false).await;
    assert_eq!(result, Err(PipelineError::TimedOut { actor: ACTOR }));
    assert_eq!(handle.snapshot().await.unwrap(), before);
    assert!(!handle.confirm(Reply::Accept));
}

#[tokio::test(start_paused = true)]
async fn cancelled_prompt_aborts() {
    let Harness {
        handle,
        mut notices,
    } = spawn();
    let worker = handle.clone();
    let attempt = tokio::spawn(async move { worker.use_object(TOOL, GEM, false).await });
    next_prompt(&mut notices).await;
    assert!(handle.cancel_confirmation());
    assert_eq!(
        attempt.await.unwrap(),
        Err(PipelineError::Cancelled { actor: ACTOR })
    );
}

#[tokio::test(start_paused = true)]
async fn confirmed_attempt_skips_the_prompt_and_the_clap() {
    let Harness {
        handle,
        mut notices,
    } = spawn();
    let started = Instant::now();
    let outcome = handle.use_object(TOOL, GEM, true).await.unwrap();
    assert!(outcome.success);
    assert!(started.elapsed() < Duration::from_millis(1_500));
    assert!(
        !drain(&mut notices)
            .iter()
            .any(|notice| matches!(notice, Notice::Confirm { .. }))
    );
}

// =============================================================================
// Busy flag and stance
// =============================================================================

#[tokio::test(start_paused = true)]
async fn overlapping_use_is_rejected_not_queued() {
    let Harness {
        handle,
        mut notices,
    } = spawn();
    let worker = handle.clone();
    let first = tokio::spawn(async move { worker.use_object(TOOL, GEM, false).await });
    next_prompt(&mut notices).await;

    let second = handle.use_object(TOOL, GEM, true).await;
    assert_eq!(second, Err(PipelineError::Busy { actor: ACTOR }));
    assert!(drain(&mut notices).contains(&Notice::Error {
        to: ACTOR,
        error: WeenieError::YoureTooBusy,
    }));

    handle.confirm(Reply::Accept);
    assert!(first.await.unwrap().is_ok());
    assert!(handle.use_object(TOOL, GEM, true).await.is_err());
    assert!(!handle.is_busy());
}

#[tokio::test(start_paused = true)]
async fn abandoned_use_on_a_full_queue_releases_the_actor() {
    let Harness { handle, .. } = spawn();
    // The queue task has not been polled yet, so these fill every slot.
    for _ in 0..16 {
        handle.set_combat_mode(CombatMode::NonCombat).await.unwrap();
    }

    tokio::select! {
        biased;
        _ = handle.use_object(TOOL, GEM, true) => panic!("the queue had room"),
        () = std::future::ready(()) => {}
    }
    assert!(!handle.is_busy());

    let outcome = handle.use_object(TOOL, GEM, true).await.unwrap();
    assert!(outcome.success);
    assert!(!handle.is_busy());
}

#[tokio::test(start_paused = true)]
async fn combat_stance_is_rejected_when_disallowed() {
    let Harness {
        handle,
        mut notices,
    } = spawn();
    handle.set_combat_mode(CombatMode::Melee).await.unwrap();

    let result = handle.use_object(TOOL, GEM, true).await;
    assert_eq!(
        result,
        Err(PipelineError::Craft(CraftError::NotInPeaceMode { actor: ACTOR }))
    );
    assert!(drain(&mut notices).contains(&Notice::Error {
        to: ACTOR,
        error: WeenieError::YouMustBeInPeaceModeToTrade,
    }));
}

#[tokio::test(start_paused = true)]
async fn allowed_combat_crafting_drops_to_peace_first() {
    let mut config = config();
    config.crafting.allow_combat_mode_crafting = true;
    let Harness { handle, .. } = spawn_with(
        &config,
        carver(),
        vec![held(TOOL, TOOL_CLASS, "Carving Tool"), held(GEM, GEM_CLASS, "Uncut Gem")],
    );
    handle.set_combat_mode(CombatMode::Missile).await.unwrap();

    let started = Instant::now();
    let outcome = handle.use_object(TOOL, GEM, true).await.unwrap();
    assert!(outcome.success);
    assert!(started.elapsed() >= Duration::from_millis(1_000));
    let state = handle.snapshot().await.unwrap();
    assert_eq!(state.crafter.combat_mode, CombatMode::NonCombat);
}

// =============================================================================
// Failures and salvage
// =============================================================================

#[tokio::test(start_paused = true)]
async fn missing_object_reports_a_general_error() {
    let Harness {
        handle,
        mut notices,
    } = spawn();
    let result = handle.use_object(TOOL, EntityId(999), true).await;
    assert_eq!(
        result,
        Err(PipelineError::Craft(CraftError::ObjectNotFound(EntityId(999))))
    );
    assert!(drain(&mut notices).contains(&Notice::Error {
        to: ACTOR,
        error: WeenieError::CraftGeneralErrorUiMsg,
    }));
    assert!(!handle.is_busy());
}

#[tokio::test(start_paused = true)]
async fn salvage_bags_combine_through_the_queue() {
    fn bag(id: u32, structure: i32) -> WorldObject {
        let mut bag = WorldObject::new(
            EntityId(id),
            20_983,
            ItemType::TinkeringMaterial,
            WeenieType::Salvage,
            &format!("Salvage ({structure})"),
        );
        bag.placement = Placement::Inventory { owner: ACTOR };
        bag.properties
            .set_int(IntKey::MATERIAL_TYPE, MaterialType::Iron.id());
        bag.properties.set_int(IntKey::STRUCTURE, structure);
        bag.properties.set_int(IntKey::VALUE, structure.saturating_mul(10));
        bag.properties.set_int(IntKey::NUM_ITEMS_IN_MATERIAL, 1);
        bag.properties.set_int(IntKey::ITEM_WORKMANSHIP, 5);
        bag
    }

    let Harness { handle, .. } = spawn_with(&config(), carver(), vec![bag(80, 30), bag(81, 40)]);
    let outcome = handle.use_object(EntityId(80), EntityId(81), true).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.destroyed, vec![EntityId(80)]);

    let state = handle.snapshot().await.unwrap();
    assert!(!state.objects.contains_key(&EntityId(80)));
    let merged = state.objects.get(&EntityId(81)).unwrap();
    assert_eq!(merged.properties.get_int(IntKey::STRUCTURE), Some(70));
    assert_eq!(merged.properties.get_int(IntKey::VALUE), Some(700));
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_returns_the_final_state() {
    let config = config();
    let engine = CraftingEngine::new(config.crafting.clone()).with_curve(Box::new(FixedCurve(1.0)));
    let services = Services::new(&config, Arc::new(lookup())).with_engine(engine);
    let state = ActorState::new(
        carver(),
        vec![held(TOOL, TOOL_CLASS, "Carving Tool"), held(GEM, GEM_CLASS, "Uncut Gem")],
    );
    let (handle, task) = ActorHandle::spawn(state, services, Box::new(NoHooks));
    handle.use_object(TOOL, GEM, true).await.unwrap();
    drop(handle);

    let last = task.await.unwrap();
    assert!(last.objects.contains_key(&EntityId(FIRST_GUID)));
    assert!(!last.objects.contains_key(&GEM));
}
