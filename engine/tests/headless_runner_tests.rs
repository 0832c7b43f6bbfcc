use engine::{HeadlessRunner, Simulation};

/// Falls under constant gravity until it hits the floor, then stops.
#[derive(Debug)]
struct Ball {
    y: f64,
    vy: f64,
    bounces: u32,
}

#[derive(Debug, Clone, Copy)]
enum BallInput {
    Idle,
    Kick(f64),
}

impl Simulation for Ball {
    type Input = BallInput;
    type Snapshot = (f64, u32);

    fn advance(&mut self, input: BallInput, dt: f64) {
        if let BallInput::Kick(v) = input {
            self.vy = -v;
        }
        self.vy += 10.0 * dt;
        self.y += self.vy * dt;
        if self.y > 100.0 {
            self.y = 100.0;
            self.vy = 0.0;
            self.bounces += 1;
        }
    }

    fn snapshot(&self) -> Self::Snapshot {
        (self.y, self.bounces)
    }
}

fn ball() -> Ball {
    Ball {
        y: 0.0,
        vy: 0.0,
        bounces: 0,
    }
}

#[test]
fn identical_inputs_replay_identically() {
    let script: Vec<(BallInput, f64)> = (0..200)
        .map(|i| {
            let input = if i % 50 == 0 {
                BallInput::Kick(5.0)
            } else {
                BallInput::Idle
            };
            (input, 1.0 / 60.0)
        })
        .collect();

    let mut a = HeadlessRunner::new(ball());
    let mut b = HeadlessRunner::new(ball());
    a.run(script.iter().copied());
    b.run(script.iter().copied());

    assert_eq!(a.frame(), 200);
    assert_eq!(a.history(), b.history());
}

#[test]
fn simulation_mut_changes_are_visible_in_next_snapshot() {
    let mut runner = HeadlessRunner::new(ball());
    runner.simulation_mut().y = 99.99;
    runner.step(BallInput::Idle, 1.0);

    assert_eq!(runner.snapshot().1, 1);
    assert_eq!(runner.simulation().y, 100.0);
}
