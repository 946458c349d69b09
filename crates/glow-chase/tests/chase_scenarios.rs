//! End to end runs of the chase loop against fake lines, a fake clock and a sleep that records
//! what was lit and for how long.

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::thread;

use embassy_futures::block_on;
use embassy_time::{Duration, Instant};
use embedded_hal::digital::{ErrorType, OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;
use glow_chase::{
    ChaseAnimator, Clock, Counter, DEBOUNCE_THRESHOLD, DEFAULT_COUNTER, DELAY_MULTIPLIER,
    Direction, InputController, MAX_COUNTER, MIN_COUNTER,
};

const LINES: usize = 5;

#[derive(Default)]
struct Board {
    lit: RefCell<[bool; LINES]>,
    /// Every `set_high`, in order
    activations: RefCell<Vec<usize>>,
    /// The lit lines at the start of every sleep
    samples: RefCell<Vec<Vec<usize>>>,
    delays: RefCell<Vec<Duration>>,
    now_us: Cell<u64>,
}

impl Board {
    fn lit_lines(&self) -> Vec<usize> {
        self.lit
            .borrow()
            .iter()
            .enumerate()
            .filter_map(|(i, on)| on.then_some(i))
            .collect()
    }

    fn delay_ms(&self, step: usize) -> u64 {
        self.delays.borrow()[step].as_millis()
    }
}

impl Clock for Board {
    fn now(&self) -> Instant {
        Instant::from_micros(self.now_us.get())
    }
}

struct FakeLine<'a> {
    index: usize,
    board: &'a Board,
}

impl ErrorType for FakeLine<'_> {
    type Error = Infallible;
}

impl OutputPin for FakeLine<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.board.lit.borrow_mut()[self.index] = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.board.lit.borrow_mut()[self.index] = true;
        self.board.activations.borrow_mut().push(self.index);
        Ok(())
    }
}

/// Records each sleep, advances the board clock past it, then calls `on_sleep` with the index of
/// the step that just slept
struct FakeSleep<'a, F: FnMut(usize)> {
    board: &'a Board,
    on_sleep: F,
}

impl<F: FnMut(usize)> FakeSleep<'_, F> {
    fn sleep(&mut self, duration: Duration) {
        let step = self.board.delays.borrow().len();
        self.board.samples.borrow_mut().push(self.board.lit_lines());
        self.board.delays.borrow_mut().push(duration);
        self.board
            .now_us
            .set(self.board.now_us.get() + duration.as_micros());
        (self.on_sleep)(step);
    }
}

impl<F: FnMut(usize)> DelayNs for FakeSleep<'_, F> {
    async fn delay_ns(&mut self, ns: u32) {
        self.sleep(Duration::from_nanos(ns.into()));
    }

    async fn delay_us(&mut self, us: u32) {
        self.sleep(Duration::from_micros(us.into()));
    }
}

fn animator<'a, F: FnMut(usize)>(
    board: &'a Board,
    counter: &'a Counter,
    on_sleep: F,
) -> ChaseAnimator<'a, FakeLine<'a>, FakeSleep<'a, F>, LINES> {
    let lines = core::array::from_fn(|index| FakeLine { index, board });
    ChaseAnimator::new(lines, FakeSleep { board, on_sleep }, counter)
}

#[test]
fn forward_sweep_lights_each_line_once_in_order() {
    let board = Board::default();
    let counter = Counter::default();
    let mut chase = animator(&board, &counter, |_| {});

    assert_eq!(chase.direction(), Direction::Forward);
    assert_eq!(block_on(chase.traverse()), Ok(Direction::Forward));

    assert_eq!(*board.activations.borrow(), [0, 1, 2, 3, 4]);
    let samples = board.samples.borrow();
    assert_eq!(samples.len(), LINES);
    for (i, sample) in samples.iter().enumerate() {
        assert_eq!(*sample, [i]);
    }
    assert_eq!(board.lit_lines(), [4]);
    assert_eq!(chase.direction(), Direction::Backward);
}

#[test]
fn sweeps_alternate_direction() {
    let board = Board::default();
    let counter = Counter::default();
    let mut chase = animator(&board, &counter, |_| {});

    let mut expected = Direction::Forward;
    for _ in 0..8 {
        assert_eq!(block_on(chase.traverse()), Ok(expected));
        expected = expected.flip();
    }

    let activations = board.activations.borrow();
    assert_eq!(activations[..LINES], [0, 1, 2, 3, 4]);
    assert_eq!(activations[LINES..2 * LINES], [4, 3, 2, 1, 0]);
    assert_eq!(activations[2 * LINES..3 * LINES], [0, 1, 2, 3, 4]);
}

#[test]
fn exactly_one_line_lit_and_end_line_dwells_at_reversal() {
    let board = Board::default();
    let counter = Counter::default();
    let mut chase = animator(&board, &counter, |_| {});

    for _ in 0..4 {
        block_on(chase.traverse()).unwrap();
    }

    let samples = board.samples.borrow();
    assert!(samples.iter().all(|s| s.len() == 1));
    let lit: Vec<usize> = samples.iter().map(|s| s[0]).collect();
    // The end line carries over into the first step of the next sweep
    assert_eq!(lit[..10], [0, 1, 2, 3, 4, 4, 3, 2, 1, 0]);
    assert_eq!(lit[10..], [0, 1, 2, 3, 4, 4, 3, 2, 1, 0]);
}

#[test]
fn speed_follows_counter_mid_sweep() {
    let board = Board::default();
    let counter = Counter::new(DEFAULT_COUNTER);
    let mut input = InputController::new(&counter, &board);
    let mut chase = animator(&board, &counter, |step| {
        // One press during each of the first eleven sleeps
        if step <= 10 {
            input.on_increase_edge(PinState::High);
        }
    });

    for _ in 0..3 {
        block_on(chase.traverse()).unwrap();
    }

    assert_eq!(board.delay_ms(0), 250);
    assert_eq!(board.delay_ms(1), 260);
    // Counter changes land on the very next step, even inside a sweep
    for step in 0..=11 {
        assert_eq!(board.delay_ms(step), 250 + 10 * step as u64);
    }
    assert_eq!(board.delay_ms(14), 360);
    assert_eq!(counter.get(), 36);
}

#[test]
fn many_presses_clamp_at_the_bounds() {
    let board = Board::default();
    let counter = Counter::default();
    let mut input = InputController::new(&counter, &board);
    let mut chase = animator(&board, &counter, |step| {
        // Short step delays are inside the debounce window, so leave a quiet gap before each press
        board
            .now_us
            .set(board.now_us.get() + DEBOUNCE_THRESHOLD.as_micros());
        if step < 40 {
            input.on_increase_edge(PinState::High);
        } else {
            input.on_decrease_edge(PinState::High);
        }
    });

    for _ in 0..20 {
        block_on(chase.traverse()).unwrap();
    }

    let delays = board.delays.borrow();
    assert_eq!(delays[40], DELAY_MULTIPLIER * u32::from(MAX_COUNTER));
    assert_eq!(counter.get(), MIN_COUNTER);
    assert_eq!(*delays.last().unwrap(), DELAY_MULTIPLIER * u32::from(MIN_COUNTER));
    assert!(
        delays
            .iter()
            .all(|d| *d >= DELAY_MULTIPLIER && *d <= DELAY_MULTIPLIER * u32::from(MAX_COUNTER))
    );
}

#[test]
fn presses_every_step_are_locked_out_below_the_debounce_window() {
    let board = Board::default();
    // 30 ms per step, shorter than the debounce window
    let counter = Counter::new(3);
    let mut input = InputController::new(&counter, &board);
    let mut chase = animator(&board, &counter, |_| {
        input.on_increase_edge(PinState::High);
    });

    for _ in 0..4 {
        block_on(chase.traverse()).unwrap();
    }

    // The first press is taken, after that every press lands 40 ms after the previous one and
    // restamps the window, so none get through
    assert_eq!(counter.get(), 4);
    assert_eq!(board.delay_ms(0), 30);
    assert!(board.delays.borrow()[1..].iter().all(|d| d.as_millis() == 40));
}

#[test]
fn contact_bounce_during_a_step_counts_once() {
    let board = Board::default();
    let counter = Counter::default();
    let mut input = InputController::new(&counter, &board);
    let mut chase = animator(&board, &counter, |step| {
        if step == 0 {
            // Press, two bounces and the release all within a few microseconds
            input.on_decrease_edge(PinState::High);
            input.on_decrease_edge(PinState::Low);
            input.on_decrease_edge(PinState::High);
            input.on_decrease_edge(PinState::Low);
        }
    });

    block_on(chase.traverse()).unwrap();

    assert_eq!(counter.get(), DEFAULT_COUNTER - 1);
    assert_eq!(board.delay_ms(0), 250);
    assert_eq!(board.delay_ms(1), 240);
}

#[test]
fn release_returns_the_lines_as_left() {
    let board = Board::default();
    let counter = Counter::default();
    let mut chase = animator(&board, &counter, |_| {});

    block_on(chase.traverse()).unwrap();
    block_on(chase.step()).unwrap();
    let (lines, _) = chase.release();

    assert_eq!(lines.len(), LINES);
    assert_eq!(board.lit_lines(), [4]);
}

// Edges arrive from another context while the chase keeps reading the counter. Every delay the
// chase picks must come from a valid counter value.
#[test]
fn edges_from_another_thread_never_break_the_chase() {
    struct TickClock(Cell<u64>);

    impl Clock for TickClock {
        fn now(&self) -> Instant {
            let t = self.0.get() + 60;
            self.0.set(t);
            Instant::from_millis(t)
        }
    }

    let counter = Counter::default();
    thread::scope(|s| {
        s.spawn(|| {
            let mut input = InputController::new(&counter, TickClock(Cell::new(0)));
            for i in 0..2000 {
                if i % 300 < 150 {
                    input.on_increase_edge(PinState::High);
                } else {
                    input.on_decrease_edge(PinState::High);
                }
            }
        });

        let board = Board::default();
        let mut chase = animator(&board, &counter, |_| thread::yield_now());
        for _ in 0..40 {
            block_on(chase.traverse()).unwrap();
        }
        let delays = board.delays.borrow();
        assert!(delays.iter().all(|d| {
            *d >= DELAY_MULTIPLIER && *d <= DELAY_MULTIPLIER * u32::from(MAX_COUNTER)
        }));
    });
    assert!((MIN_COUNTER..=MAX_COUNTER).contains(&counter.get()));
}
