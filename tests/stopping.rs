//! Cooperative stop, forced termination, and the engine-wide drain.

mod common;

use std::time::Duration;

use tokio::time::sleep;

use tasklane::{Engine, EventKind, TaskOptions, TaskSlot, Value};

use common::{ignore_stop_for, next_event, poll_until_stopped, sleeper};

#[tokio::test]
async fn cooperative_stop_ends_in_finished() {
    let engine = Engine::new();
    let mut events = engine.subscribe();

    engine
        .register_with(
            20,
            poll_until_stopped(0),
            TaskOptions::new().with_stop_timeout(Duration::from_millis(500)),
        )
        .unwrap();

    let id = engine.add_task(20, ()).unwrap();
    let started = next_event(&mut events).await;
    assert_eq!((started.kind, started.id), (EventKind::TaskStarted, id));

    sleep(Duration::from_millis(20)).await;
    engine.stop_by_id(id);

    // The callable honours the flag: a normal finish, not a termination.
    let finished = next_event(&mut events).await;
    assert_eq!((finished.kind, finished.id), (EventKind::TaskFinished, id));
    assert_eq!(finished.result, Some(Value::Int(0)));
    assert!(engine.is_idle().await);

    // The deferred check at +500 ms finds the task settled and does
    // nothing; the engine keeps admitting work.
    sleep(Duration::from_millis(550)).await;
    assert!(events.try_recv().is_err());
    engine.add_task(20, ()).unwrap();
    let ev = next_event(&mut events).await;
    assert_eq!(ev.kind, EventKind::TaskStarted);
}

#[tokio::test]
async fn uncooperative_task_is_terminated_after_grace() {
    let engine = Engine::new();
    let mut events = engine.subscribe();

    engine
        .register_with(
            21,
            ignore_stop_for(Duration::from_secs(2)),
            TaskOptions::new()
                .with_group(1)
                .with_stop_timeout(Duration::from_millis(200)),
        )
        .unwrap();

    let id = engine.add_task(21, ()).unwrap();
    let started = next_event(&mut events).await;
    assert_eq!((started.kind, started.id), (EventKind::TaskStarted, id));

    sleep(Duration::from_millis(10)).await;
    engine.stop_by_id(id);

    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskTerminated, id));
    assert_eq!(ev.result, None);
    assert!(engine.is_idle().await);
}

#[tokio::test]
async fn zero_stop_timeout_terminates_on_the_next_tick() {
    let engine = Engine::new();
    let mut events = engine.subscribe();

    engine
        .register_with(
            22,
            ignore_stop_for(Duration::from_secs(1)),
            TaskOptions::new().with_stop_timeout(Duration::ZERO),
        )
        .unwrap();

    let id = engine.add_task(22, ()).unwrap();
    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskStarted);

    engine.stop_by_id(id);
    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskTerminated, id));
}

#[tokio::test]
async fn double_stop_has_no_extra_effects() {
    let engine = Engine::new();
    let mut events = engine.subscribe();

    engine
        .register_with(
            23,
            poll_until_stopped(7),
            TaskOptions::new().with_stop_timeout(Duration::from_millis(100)),
        )
        .unwrap();

    let id = engine.add_task(23, ()).unwrap();
    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskStarted);

    engine.stop_by_id(id);
    engine.stop_by_id(id);

    let finished = next_event(&mut events).await;
    assert_eq!((finished.kind, finished.id), (EventKind::TaskFinished, id));

    // Both deferred checks fire against a settled task: no second event.
    sleep(Duration::from_millis(250)).await;
    assert!(events.try_recv().is_err());
    assert!(engine.is_idle().await);
}

#[tokio::test]
async fn stop_selects_by_type_and_by_group() {
    let engine = Engine::new();
    let mut events = engine.subscribe();

    engine
        .register_with(50, poll_until_stopped(1), TaskOptions::new().with_group(9))
        .unwrap();

    let by_type = engine.add_task(50, ()).unwrap();
    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskStarted);
    engine.stop_by_type(50);
    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskFinished, by_type));

    let by_group = engine.add_task(50, ()).unwrap();
    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskStarted);
    engine.stop_by_group(9);
    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskFinished, by_group));
}

#[tokio::test]
async fn stop_on_a_settled_id_is_a_no_op() {
    let engine = Engine::new();
    let mut events = engine.subscribe();

    engine.register(51, || ()).unwrap();
    let id = engine.add_task(51, ()).unwrap();
    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskStarted);
    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskFinished);

    engine.stop_by_id(id);
    engine.terminate_by_id(id);
    engine.stop_by_type(51);
    engine.stop_by_group(0);

    sleep(Duration::from_millis(50)).await;
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn direct_terminate_skips_the_grace_period() {
    let engine = Engine::new();
    let mut events = engine.subscribe();

    engine
        .register_with(
            52,
            ignore_stop_for(Duration::from_secs(1)),
            TaskOptions::new().with_stop_timeout(Duration::from_secs(5)),
        )
        .unwrap();

    let id = engine.add_task(52, ()).unwrap();
    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskStarted);

    engine.terminate_by_id(id);
    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskTerminated, id));
}

#[tokio::test]
async fn engine_drain_keeps_the_queue_and_reopens_admissions() {
    let engine = Engine::new();
    let mut events = engine.subscribe();

    let drain_opts = |group| {
        TaskOptions::new()
            .with_group(group)
            .with_stop_timeout(Duration::from_millis(300))
    };
    engine.register_with(60, poll_until_stopped(3), drain_opts(3)).unwrap();
    engine.register_with(61, poll_until_stopped(4), drain_opts(4)).unwrap();
    engine
        .register_with(62, sleeper(Duration::ZERO), drain_opts(3))
        .unwrap();

    let a = engine.add_task(60, ()).unwrap();
    let b = engine.add_task(61, ()).unwrap();
    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskStarted);
    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskStarted);

    // Same group as the first task: waits in the queue.
    let queued = engine.add_task(62, ()).unwrap();
    assert_eq!(engine.task_added_by_type(62).await, Some(TaskSlot::Queued));

    engine.stop_tasks();

    // Both active tasks stop cooperatively.
    let first = next_event(&mut events).await;
    let second = next_event(&mut events).await;
    assert_eq!(first.kind, EventKind::TaskFinished);
    assert_eq!(second.kind, EventKind::TaskFinished);
    let stopped = [first.id, second.id];
    assert!(stopped.contains(&a) && stopped.contains(&b));

    // Active is drained; the queued task is held back until admissions
    // re-open, then runs.
    assert!(engine.is_idle().await);
    assert_eq!(engine.task_added_by_type(62).await, Some(TaskSlot::Queued));

    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskStarted, queued));
    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskFinished, queued));

    // New dispatches are admitted again.
    let fresh = engine.add_task(60, ()).unwrap();
    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskStarted, fresh));
    engine.stop_by_id(fresh);
    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskFinished);
}

#[tokio::test]
async fn stop_tasks_when_idle_is_a_no_op() {
    let engine = Engine::new();
    let mut events = engine.subscribe();

    engine.register(70, || ()).unwrap();
    engine.stop_tasks();

    // Admissions were never blocked.
    let id = engine.add_task(70, ()).unwrap();
    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskStarted, id));
}

#[tokio::test]
async fn panicking_callable_finishes_empty_and_frees_its_group() {
    let engine = Engine::new();
    let mut events = engine.subscribe();

    engine.register(80, || -> i64 { panic!("exploded") }).unwrap();
    engine.register(81, || 5i64).unwrap();

    let id = engine.add_task(80, ()).unwrap();
    let follow_up = engine.add_task(81, ()).unwrap();

    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskStarted);
    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskFinished, id));
    assert_eq!(ev.result, Some(Value::Empty));

    // Scheduler state advanced: the same-group follow-up runs.
    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskStarted, follow_up));
    let ev = next_event(&mut events).await;
    assert_eq!(ev.result, Some(Value::Int(5)));
}

#[tokio::test]
async fn flag_set_before_timeout_still_counts_as_finished() {
    let engine = Engine::new();
    let mut events = engine.subscribe();

    // Returns on its own after 50 ms, ignoring the flag entirely.
    engine
        .register_with(
            90,
            sleeper(Duration::from_millis(50)),
            TaskOptions::new().with_stop_timeout(Duration::from_millis(300)),
        )
        .unwrap();

    let id = engine.add_task(90, ()).unwrap();
    assert_eq!(next_event(&mut events).await.kind, EventKind::TaskStarted);

    engine.stop_by_id(id);

    // The callable returns before the grace period elapses: Finished, and
    // the deferred check is a no-op.
    let ev = next_event(&mut events).await;
    assert_eq!((ev.kind, ev.id), (EventKind::TaskFinished, id));
    sleep(Duration::from_millis(350)).await;
    assert!(events.try_recv().is_err());
}
