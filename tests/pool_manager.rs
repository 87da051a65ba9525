mod common;

use std::time::Duration;

use common::{FakeText, TEN_ACTIONS};
use fanto::error::ServiceError;
use fanto::pool::{ActionGenerator, ActionPhrase, ActionPool, Origin};

async fn seeded_pool() -> ActionPool {
    let generator = ActionGenerator::new(FakeText::fixed(TEN_ACTIONS), 10);
    let mut pool = ActionPool::new(5, 3);
    assert_eq!(pool.initialize(&generator, Duration::ZERO).await, 10);
    pool
}

fn slot_text(pool: &ActionPool, index: usize) -> Option<String> {
    pool.slots()[index].phrase.as_ref().map(|p| p.text.clone())
}

#[tokio::test]
async fn initialize_fills_slots_in_order_then_backlog() {
    let text = FakeText::fixed(TEN_ACTIONS);
    let generator = ActionGenerator::new(text.clone(), 10);
    let mut pool = ActionPool::new(5, 3);

    pool.initialize(&generator, Duration::ZERO).await;

    assert_eq!(slot_text(&pool, 0).as_deref(), Some("Paint him neon pink!"));
    assert_eq!(slot_text(&pool, 4).as_deref(), Some("Make him slip on poop!"));
    assert_eq!(pool.backlog().len(), 5);
    assert_eq!(pool.backlog()[0].text, "Turn him into toilet paper!");
    assert!(pool.visible().all(|p| !p.fresh), "only promoted phrases are fresh");

    // No exclusions on the very first request.
    assert_eq!(text.calls(), 1);
    assert!(text.request(0).system.ends_with("existing actions:\n"));
    assert!(text.request(0).user.contains("Generate 10 unique slapstick commands"));
}

#[tokio::test]
async fn initialize_with_short_batch_leaves_trailing_slots_empty() {
    let generator = ActionGenerator::new(FakeText::fixed("1. Paint him neon pink!\n2. Feed him rotten eggs!"), 10);
    let mut pool = ActionPool::new(5, 3);

    assert_eq!(pool.initialize(&generator, Duration::ZERO).await, 2);
    assert!(pool.slots()[1].phrase.is_some());
    assert!(pool.slots()[2].is_empty());
    assert!(pool.backlog().is_empty());
}

#[tokio::test]
async fn consume_promotes_backlog_head_into_vacated_slot() {
    let mut pool = seeded_pool().await;
    let id = pool.slots()[2].phrase.as_ref().unwrap().id;
    let head = pool.backlog()[0].clone();

    let consumed = pool.consume(id).expect("phrase is on screen");

    assert_eq!(consumed.text, "Cover him in bug slime!");
    assert_eq!(consumed.origin, Origin::Generated);
    assert_eq!(consumed.slot, Some(2));
    assert_eq!(consumed.promoted, Some(head.id));

    let promoted = pool.slots()[2].phrase.as_ref().unwrap();
    assert_eq!(promoted.text, head.text);
    assert!(promoted.fresh);
    assert_eq!(pool.backlog().len(), 4);
    assert!(pool.used().contains("Cover him in bug slime!"));
}

#[tokio::test]
async fn consume_with_dry_backlog_leaves_slot_empty() {
    let mut pool = ActionPool::new(5, 3);
    pool.place(ActionPhrase::generated("Paint him neon pink!")).unwrap();
    pool.place(ActionPhrase::generated("Feed him rotten eggs!")).unwrap();
    let id = pool.slots()[0].phrase.as_ref().unwrap().id;

    let consumed = pool.consume(id).unwrap();

    assert_eq!(consumed.promoted, None);
    assert!(pool.slots()[0].is_empty());
    assert_eq!(pool.backlog().len(), 0);
    assert_eq!(slot_text(&pool, 1).as_deref(), Some("Feed him rotten eggs!"));

    // Second drop of the same phrase is a no-op.
    assert!(pool.consume(id).is_none());
    assert_eq!(pool.used().len(), 1);
}

#[tokio::test]
async fn replenishment_excludes_everything_known_and_filters_duplicates() {
    let mut pool = seeded_pool().await;
    for index in 0..3 {
        let id = pool.slots()[index].phrase.as_ref().unwrap().id;
        pool.consume(id).unwrap();
    }
    assert_eq!(pool.backlog().len(), 2);
    assert!(pool.needs_replenish());

    let exclusions = pool.replenishment_request().expect("backlog is low");
    assert!(exclusions.contains(&"Paint him neon pink!".to_string()), "used phrase excluded");
    assert!(exclusions.contains(&"Unleash skunks around him!".to_string()), "visible phrase excluded");
    assert!(exclusions.contains(&"Dunk him in custard!".to_string()), "backlog phrase excluded");

    let text = FakeText::fixed(
        "1. Paint him bright pink!\n2. Squirt him with ketchup!\n3. Glue feathers on him!\n4. Shave his trunk bald!",
    );
    let generator = ActionGenerator::new(text.clone(), 10);
    let phrases = generator.generate(&exclusions).await.unwrap();
    assert!(text.request(0).system.ends_with(&exclusions.join("\n")));

    assert_eq!(pool.absorb(phrases), 3);
    assert_eq!(pool.backlog().len(), 5);
    assert!(pool.backlog().iter().all(|p| p.text != "Paint him bright pink!"));
    assert!(pool.replenishment_request().is_none());
}

#[tokio::test]
async fn no_replenishment_while_backlog_is_full() {
    let pool = seeded_pool().await;
    assert!(!pool.needs_replenish());
    assert!(pool.replenishment_request().is_none());
}

#[tokio::test]
async fn used_phrases_block_similar_regeneration() {
    let mut pool = seeded_pool().await;
    let id = pool.slots()[1].phrase.as_ref().unwrap().id;
    pool.consume(id).unwrap(); // "Feed him rotten eggs!"

    let kept = pool.absorb(vec![
        ActionPhrase::generated("Feed him rotten tomatoes!"),
        ActionPhrase::generated("Feeding time with rotten cabbage for him!"),
    ]);

    assert_eq!(kept, 0);
    assert!(pool
        .visible()
        .chain(pool.backlog().iter())
        .all(|p| !fanto::text::is_similar("Feed him rotten eggs!", &p.text)));
}

#[tokio::test]
async fn custom_tray_accepts_typed_actions() {
    let mut pool = seeded_pool().await;

    let id = pool.add_custom("  Paint the <i>fence</i> purple!  ").unwrap();
    assert_eq!(pool.custom()[0].text, "Paint the fence purple!");
    assert_eq!(pool.custom()[0].origin, Origin::Custom);

    assert_eq!(pool.add_custom("   ").unwrap_err().message, "Type something mean...");
    assert_eq!(
        pool.add_custom("Feed him rotten cheese!").unwrap_err().message,
        "Action too similar to existing ones"
    );

    let slots_before = pool.slots().to_vec();
    let consumed = pool.consume(id).unwrap();
    assert_eq!(consumed.origin, Origin::Custom);
    assert_eq!(consumed.slot, None);
    assert!(pool.custom().is_empty());
    assert!(pool.used().contains("Paint the fence purple!"));
    assert_eq!(pool.slots(), slots_before.as_slice());
}

#[tokio::test]
async fn rewrite_maps_model_verdicts() {
    let exclusions = vec!["Paint him neon pink!".to_string(), "Feed him rotten eggs!".to_string()];

    let text = FakeText::fixed("\"Make him dance!\"");
    let generator = ActionGenerator::new(text.clone(), 10);
    assert_eq!(generator.rewrite("make the elephant dance", &exclusions).await, Ok("Make him dance!".to_string()));
    assert!(text
        .request(0)
        .user
        .contains("Existing actions: Paint him neon pink!, Feed him rotten eggs!"));

    let generator = ActionGenerator::new(FakeText::fixed("INVALID: Too long, exceeds 6 words"), 10);
    let rejection = generator.rewrite("throw peels everywhere around him", &exclusions).await.unwrap_err();
    assert_eq!(rejection.message, "Too long, exceeds 6 words");

    let generator = ActionGenerator::new(
        FakeText::new(|_| Err(ServiceError::MissingCredential { service: "Together" })),
        10,
    );
    assert_eq!(generator.rewrite("x him", &exclusions).await.unwrap_err().message, "API key missing");

    let generator = ActionGenerator::new(FakeText::failing(), 10);
    assert_eq!(
        generator.rewrite("x him", &exclusions).await.unwrap_err().message,
        "Failed to validate action"
    );
}
