use engine::HeadlessRunner;
use stairjump::autoplay::{Autoplay, run_autoplay};
use stairjump::config::{GameConfig, JumpConfig};
use stairjump::gesture::ScriptedGesture;
use stairjump::session::{GameSession, SessionInput, SessionOutcome};

const DT: f64 = 1.0 / 60.0;

fn quiet_runner(config: GameConfig) -> HeadlessRunner<GameSession> {
    HeadlessRunner::new(GameSession::with_source(
        config,
        Box::new(ScriptedGesture::default()),
    ))
}

#[test]
fn autoplay_clears_default_course() {
    let mut runner = quiet_runner(GameConfig::default()).without_history();
    let mut autoplay = Autoplay::new(0.6, 40.0);

    let report = run_autoplay(&mut runner, &mut autoplay, DT, 3600);
    assert_eq!(report.outcome, SessionOutcome::Won);
    assert_eq!(report.jumps, 5);
    assert_eq!(report.final_platform, 4);
    assert!(report.ticks < 3600);
    assert_eq!(runner.frame(), report.ticks);
}

#[test]
fn autoplay_waits_out_the_cadence_before_each_jump() {
    let runner = quiet_runner(GameConfig::default());
    let session = runner.simulation();
    let mut autoplay = Autoplay::new(0.5, 10.0);

    let mut first_jump_tick = None;
    for tick in 1..=60 {
        if let SessionInput::ManualJump(strength) = autoplay.next_input(session, DT) {
            assert_eq!(strength, 10.0);
            first_jump_tick = Some(tick);
            break;
        }
    }
    let tick = first_jump_tick.expect("jumped within a second");
    assert!((30..=31).contains(&tick), "first jump on tick {tick}");
}

#[test]
fn autoplay_stops_at_max_ticks() {
    let mut runner = quiet_runner(GameConfig::default());
    let mut autoplay = Autoplay::default();

    let report = run_autoplay(&mut runner, &mut autoplay, DT, 10);
    assert_eq!(report.ticks, 10);
    assert_eq!(report.outcome, SessionOutcome::InProgress);
    assert_eq!(report.final_platform, -1);
}

#[test]
fn autoplay_on_strict_landing_falls() {
    let config = GameConfig {
        jump: JumpConfig {
            landing_vertical_tolerance: Some(1.0),
            ..JumpConfig::default()
        },
        ..GameConfig::default()
    };
    let mut runner = quiet_runner(config);
    let mut autoplay = Autoplay::new(0.6, 40.0);

    let report = run_autoplay(&mut runner, &mut autoplay, DT, 3600);
    assert_eq!(report.outcome, SessionOutcome::Lost);
    assert_eq!(report.jumps, 1);
}

#[test]
fn autoplay_runs_replay_identically() {
    let run = || {
        let mut runner = quiet_runner(GameConfig::default());
        let mut autoplay = Autoplay::new(0.45, 20.0);
        run_autoplay(&mut runner, &mut autoplay, DT, 3600);
        runner.history().to_vec()
    };
    let a = run();
    let b = run();
    assert!(a.len() > 1);
    assert_eq!(a, b);
}
