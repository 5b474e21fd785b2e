//! Bulk transform tests.
//!
//! `map` must call the transform once per distinct value, keep matching
//! cards matching, and run value groups concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use memory_board::{Board, BoardError, BoardSpec, CellView, PlayerId, Position};
use proptest::prelude::*;
use tokio::sync::Barrier;
use tokio::time::timeout;

fn board(rows: usize, cols: usize, values: &[&str]) -> Arc<Board> {
    let values = values.iter().map(|v| v.to_string()).collect();
    Arc::new(Board::new(BoardSpec::new(rows, cols, values).unwrap()))
}

fn value_at(board: &Board, row: usize, col: usize) -> Option<String> {
    board.card_at(Position::new(row, col)).map(|card| card.value)
}

#[tokio::test]
async fn test_map_rewrites_every_card() {
    let board = board(2, 2, &["A", "B", "A", "B"]);
    let alice = PlayerId::new("alice");
    board.look(&alice);

    board
        .map(&alice, |v| async move { format!("{}!", v.to_lowercase()) })
        .await
        .unwrap();

    assert_eq!(value_at(&board, 0, 0).as_deref(), Some("a!"));
    assert_eq!(value_at(&board, 0, 1).as_deref(), Some("b!"));
    assert_eq!(value_at(&board, 1, 0).as_deref(), Some("a!"));
    assert_eq!(value_at(&board, 1, 1).as_deref(), Some("b!"));

    // Face-down cards still hide their new values
    assert_eq!(board.view(&alice).cells, vec![CellView::Down; 4]);
}

#[tokio::test]
async fn test_map_calls_transform_once_per_value() {
    let board = board(2, 3, &["A", "B", "A", "C", "A", "B"]);
    let alice = PlayerId::new("alice");
    board.look(&alice);

    let calls: Arc<Mutex<HashMap<String, usize>>> = Arc::default();
    let seen = Arc::clone(&calls);
    board
        .map(&alice, move |v| {
            *seen.lock().unwrap().entry(v.clone()).or_default() += 1;
            async move { v.repeat(2) }
        })
        .await
        .unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 3);
    assert!(calls.values().all(|&n| n == 1));
    assert_eq!(value_at(&board, 1, 1).as_deref(), Some("AA"));
}

#[tokio::test]
async fn test_map_keeps_controlled_pair_matching() {
    let board = board(1, 4, &["A", "B", "A", "B"]);
    let alice = PlayerId::new("alice");

    board.flip(&alice, Position::new(0, 0)).await.unwrap();
    board.flip(&alice, Position::new(0, 2)).await.unwrap();

    board
        .map(&alice, |v| async move { if v == "A" { "B".to_string() } else { "C".to_string() } })
        .await
        .unwrap();

    let view = board.view(&alice);
    assert_eq!(view.cells[0], CellView::Mine("B".into()));
    assert_eq!(view.cells[2], CellView::Mine("B".into()));

    // The old B cards became C, not re-transformed A cards
    assert_eq!(value_at(&board, 0, 1).as_deref(), Some("C"));
    assert_eq!(value_at(&board, 0, 3).as_deref(), Some("C"));
    assert_eq!(board.held_by(&alice).len(), 2);
}

#[tokio::test]
async fn test_map_skips_removed_cards() {
    let board = board(1, 3, &["A", "A", "B"]);
    let alice = PlayerId::new("alice");

    board.flip(&alice, Position::new(0, 0)).await.unwrap();
    board.flip(&alice, Position::new(0, 1)).await.unwrap();
    board.flip(&alice, Position::new(0, 2)).await.unwrap();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&calls);
    board
        .map(&alice, move |v| {
            seen.lock().unwrap().push(v.clone());
            async move { v.to_lowercase() }
        })
        .await
        .unwrap();

    assert_eq!(*calls.lock().unwrap(), vec!["B".to_string()]);
    assert_eq!(board.look(&alice), "1x3\nnone\nnone\nmy b\n");
}

#[tokio::test]
async fn test_map_unknown_player() {
    let board = board(1, 1, &["A"]);
    let err = board
        .map(&PlayerId::new("nobody"), |v| async move { v })
        .await
        .unwrap_err();
    assert_eq!(err, BoardError::PlayerNotFound(PlayerId::new("nobody")));
    assert_eq!(value_at(&board, 0, 0).as_deref(), Some("A"));
}

/// Two groups can only pass a two-party barrier if they run concurrently.
#[tokio::test]
async fn test_map_groups_run_concurrently() {
    let board = board(1, 2, &["A", "B"]);
    let alice = PlayerId::new("alice");
    board.look(&alice);

    let barrier = Arc::new(Barrier::new(2));
    let result = timeout(
        Duration::from_secs(5),
        board.map(&alice, move |v| {
            let barrier = Arc::clone(&barrier);
            async move {
                barrier.wait().await;
                v.repeat(2)
            }
        }),
    )
    .await
    .expect("groups should not run one after another");

    result.unwrap();
    assert_eq!(value_at(&board, 0, 0).as_deref(), Some("AA"));
    assert_eq!(value_at(&board, 0, 1).as_deref(), Some("BB"));
}

#[tokio::test]
async fn test_map_failed_transform() {
    let board = board(1, 2, &["A", "B"]);
    let alice = PlayerId::new("alice");
    board.look(&alice);

    let err = board
        .map(&alice, |v| async move {
            if v == "A" {
                panic!("cannot transform A");
            }
            v.to_lowercase()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, BoardError::TransformFailed(_)));
    assert_eq!(value_at(&board, 0, 0).as_deref(), Some("A"));
    assert_eq!(value_at(&board, 0, 1).as_deref(), Some("b"));
}

#[tokio::test]
async fn test_map_wakes_watchers_on_visible_change() {
    let board = board(1, 2, &["A", "B"]);
    let alice = PlayerId::new("alice");
    board.flip(&alice, Position::new(0, 0)).await.unwrap();

    let watcher = {
        let board = Arc::clone(&board);
        tokio::spawn(async move { board.watch(&PlayerId::new("bob")).await })
    };
    while board.watchers() == 0 {
        tokio::task::yield_now().await;
    }

    board.map(&alice, |v| async move { format!("[{}]", v) }).await.unwrap();

    let text = timeout(Duration::from_secs(5), watcher).await.unwrap().unwrap();
    assert_eq!(text, "1x2\nup [A]\ndown ?\n");
}

fn arb_board() -> impl Strategy<Value = (usize, usize, Vec<String>)> {
    (1usize..4, 1usize..5).prop_flat_map(|(rows, cols)| {
        (
            Just(rows),
            Just(cols),
            prop::collection::vec(prop::sample::select(vec!["A", "B", "C", "D"]), rows * cols)
                .prop_map(|vs| vs.into_iter().map(String::from).collect::<Vec<_>>()),
        )
    })
}

proptest! {
    /// Cards that match before a map still match after it.
    #[test]
    fn prop_map_preserves_pairs((rows, cols, values) in arb_board(), salt in 0u8..8) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let board = Arc::new(Board::new(BoardSpec::new(rows, cols, values.clone()).unwrap()));
        let alice = PlayerId::new("alice");
        board.look(&alice);

        rt.block_on(board.map(&alice, move |v| async move {
            // Collapses some values together, never splits one apart
            let code = v.bytes().map(u32::from).sum::<u32>() + u32::from(salt);
            format!("v{}", code % 3)
        }))
        .unwrap();

        let after: Vec<_> = Position::all(rows, cols)
            .map(|pos| board.card_at(pos).unwrap().value)
            .collect();
        for i in 0..values.len() {
            for j in 0..values.len() {
                if values[i] == values[j] {
                    prop_assert_eq!(&after[i], &after[j]);
                }
            }
        }
    }
}
