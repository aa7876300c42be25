//! Time-budget behavior of the fetch phase, under a paused tokio clock.

mod common;

use std::time::Duration;

use common::{numbered_file, FetchScript, ScriptedProvider};
use tracelens_core::{fetch_snippets, parse_stack_trace, select_frames, FetchBudget, SelectedFrame};

fn frames(count: usize) -> Vec<SelectedFrame> {
    let trace: String = (1..=count)
        .map(|i| format!("at f{i} (src/f{i}.js:10:1)\n"))
        .collect();
    select_frames(&parse_stack_trace(Some(&trace)), None)
}

#[tokio::test(start_paused = true)]
async fn slow_provider_never_exceeds_global_budget() {
    // Every file takes longer than the per-file limit.
    let mut provider = ScriptedProvider::new();
    for i in 1..=5 {
        provider = provider.script(
            &format!("src/f{i}.js"),
            FetchScript::Slow(Duration::from_secs(6), numbered_file(30)),
        );
    }

    let start = tokio::time::Instant::now();
    let fetched = fetch_snippets(&provider, &frames(5), "main", &FetchBudget::default()).await;
    let elapsed = start.elapsed();

    assert!(fetched.is_empty());
    assert!(
        elapsed <= Duration::from_secs(15) + Duration::from_millis(100),
        "elapsed {elapsed:?} exceeded the global budget"
    );
    // Three 5-second attempts fit in the 15-second budget.
    assert_eq!(provider.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn per_file_timeout_is_a_miss_not_an_abort() {
    let provider = ScriptedProvider::new()
        .script(
            "src/f1.js",
            FetchScript::Slow(Duration::from_secs(6), numbered_file(30)),
        )
        .script("src/f2.js", FetchScript::Ok(numbered_file(30)))
        .script("src/f3.js", FetchScript::Ok(numbered_file(30)));

    let fetched = fetch_snippets(&provider, &frames(3), "main", &FetchBudget::default()).await;

    let paths: Vec<&str> = fetched.iter().map(|f| f.snippet.path.as_str()).collect();
    assert_eq!(paths, vec!["src/f2.js", "src/f3.js"]);
    assert_eq!(fetched[0].frame_index, 1);
}

#[tokio::test(start_paused = true)]
async fn early_exit_after_top_frames_succeed() {
    let mut provider = ScriptedProvider::new();
    for i in 1..=5 {
        provider = provider.script(&format!("src/f{i}.js"), FetchScript::Ok(numbered_file(30)));
    }

    let fetched = fetch_snippets(&provider, &frames(5), "main", &FetchBudget::default()).await;

    // Two snippets from the top frames are enough; the rest are skipped.
    assert_eq!(fetched.len(), 2);
    assert_eq!(provider.calls(), vec!["src/f1.js", "src/f2.js"]);
}

#[tokio::test(start_paused = true)]
async fn partial_results_survive_slow_middle_file() {
    let provider = ScriptedProvider::new()
        .script("src/f1.js", FetchScript::Ok(numbered_file(30)))
        .script(
            "src/f2.js",
            FetchScript::Slow(Duration::from_secs(20), numbered_file(30)),
        )
        .script("src/f3.js", FetchScript::Ok(numbered_file(30)));

    let start = tokio::time::Instant::now();
    let fetched = fetch_snippets(&provider, &frames(3), "main", &FetchBudget::default()).await;
    let elapsed = start.elapsed();

    assert_eq!(fetched.len(), 2);
    assert!(elapsed < Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn missing_files_do_not_stop_the_phase() {
    let provider = ScriptedProvider::new()
        .script("src/f1.js", FetchScript::NotFound)
        .script("src/f2.js", FetchScript::Ok(numbered_file(30)))
        .script("src/f3.js", FetchScript::Ok(numbered_file(30)));

    let fetched = fetch_snippets(&provider, &frames(3), "main", &FetchBudget::default()).await;
    assert_eq!(fetched.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn shrunken_budget_is_honored() {
    let mut provider = ScriptedProvider::new();
    for i in 1..=5 {
        provider = provider.script(
            &format!("src/f{i}.js"),
            FetchScript::Slow(Duration::from_secs(2), numbered_file(30)),
        );
    }

    let budget = FetchBudget {
        per_file: Duration::from_secs(1),
        total: Duration::from_secs(3),
        early_exit_after: 2,
    };
    let start = tokio::time::Instant::now();
    let fetched = fetch_snippets(&provider, &frames(5), "main", &budget).await;

    assert!(fetched.is_empty());
    assert!(start.elapsed() <= Duration::from_secs(3) + Duration::from_millis(100));
}
