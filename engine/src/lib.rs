pub mod clock;
pub mod profiling;

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub use clock::FrameClock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeMachine<State> {
    states: Vec<State>,
    frame: usize,
}

impl<State> TimeMachine<State> {
    pub fn new(initial_state: State) -> Self {
        Self {
            states: vec![initial_state],
            frame: 0,
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self) -> &State {
        &self.states[self.frame]
    }

    pub fn history(&self) -> &[State] {
        &self.states
    }

    /// Appends `state` and moves the cursor onto it.
    pub fn record(&mut self, state: State) -> usize {
        self.states.push(state);
        self.frame = self.states.len() - 1;
        self.frame
    }

    /// Drops all history and restarts from `state` at frame 0.
    pub fn restart(&mut self, state: State) {
        self.states.clear();
        self.states.push(state);
        self.frame = 0;
    }
}

impl<State: Serialize> TimeMachine<State> {
    pub fn save_json_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, text)
    }
}

impl<State: DeserializeOwned> TimeMachine<State> {
    pub fn load_json_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let tm: Self = serde_json::from_slice(&bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if tm.states.is_empty() || tm.frame >= tm.states.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "timemachine frame {} out of range for {} states",
                    tm.frame,
                    tm.states.len()
                ),
            ));
        }
        Ok(tm)
    }
}

/// A mutable, dt-driven simulation that can be stepped by a runner.
///
/// Unlike a pure `state -> state` step function, the simulation owns its
/// collaborators (input sources, clocks) and exposes a serializable snapshot
/// for rendering and history.
pub trait Simulation {
    type Input;
    type Snapshot;

    fn advance(&mut self, input: Self::Input, dt: f64);
    fn snapshot(&self) -> Self::Snapshot;
}

#[derive(Debug)]
pub struct HeadlessRunner<S: Simulation> {
    simulation: S,
    timemachine: TimeMachine<S::Snapshot>,
    record_history: bool,
    steps: usize,
    elapsed: f64,
}

impl<S: Simulation> HeadlessRunner<S> {
    pub fn new(simulation: S) -> Self {
        let initial = simulation.snapshot();
        Self {
            simulation,
            timemachine: TimeMachine::new(initial),
            record_history: true,
            steps: 0,
            elapsed: 0.0,
        }
    }

    /// Keeps only the latest snapshot instead of the full per-step history.
    pub fn without_history(mut self) -> Self {
        self.record_history = false;
        self
    }

    /// Number of steps taken, independent of how much history is retained.
    pub fn frame(&self) -> usize {
        self.steps
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn snapshot(&self) -> &S::Snapshot {
        self.timemachine.state()
    }

    pub fn history(&self) -> &[S::Snapshot] {
        self.timemachine.history()
    }

    pub fn timemachine(&self) -> &TimeMachine<S::Snapshot> {
        &self.timemachine
    }

    pub fn simulation(&self) -> &S {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut S {
        &mut self.simulation
    }

    pub fn into_simulation(self) -> S {
        self.simulation
    }

    pub fn step(&mut self, input: S::Input, dt: f64) -> usize {
        self.simulation.advance(input, dt);
        self.elapsed += dt;
        self.record()
    }

    pub fn step_profiled<P: profiling::Profiler>(
        &mut self,
        input: S::Input,
        dt: f64,
        profiler: &mut P,
    ) -> usize {
        use std::time::Instant;

        let total_start = Instant::now();

        let advance_start = Instant::now();
        self.simulation.advance(input, dt);
        self.elapsed += dt;
        let advance_dt = advance_start.elapsed();

        let record_start = Instant::now();
        let frame = self.record();
        let record_dt = record_start.elapsed();

        let total_dt = total_start.elapsed();
        profiler.on_step(
            frame,
            profiling::StepTimings {
                advance: advance_dt,
                record: record_dt,
                total: total_dt,
            },
        );

        frame
    }

    pub fn run<I>(&mut self, inputs: I) -> usize
    where
        I: IntoIterator<Item = (S::Input, f64)>,
    {
        let mut last_frame = self.frame();
        for (input, dt) in inputs {
            last_frame = self.step(input, dt);
        }
        last_frame
    }

    fn record(&mut self) -> usize {
        let snapshot = self.simulation.snapshot();
        if self.record_history {
            self.timemachine.record(snapshot);
        } else {
            self.timemachine.restart(snapshot);
        }
        self.steps += 1;
        self.steps
    }
}
