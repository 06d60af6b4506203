//! Headless side-scroller used to score networks.
//!
//! A bird falls under gravity and flaps when the network's output exceeds
//! one half. Pipe pairs scroll towards it; touching a pipe or leaving the
//! screen ends the run. Fitness is the number of ticks survived.

use neuroevo::Simulation;
use rand::Rng;

const SCREEN_HEIGHT: f32 = 720.0;
const BIRD_X: f32 = 250.0;
const BIRD_START_Y: f32 = 400.0;
const BIRD_SIZE: f32 = 30.0;
const GRAVITY: f32 = 1.0;
const FLAP_VELOCITY: f32 = -11.0;

const PIPE_COUNT: usize = 8;
const PIPE_START_X: f32 = 700.0;
const PIPE_SPACING: f32 = 250.0;
const PIPE_WIDTH: f32 = 80.0;
const PIPE_SPEED: f32 = 8.0;
const GAP_HEIGHT: f32 = 200.0;
const GAP_MARGIN: f32 = 100.0;

/// One top/bottom pipe pair with an opening starting at `gap_y`.
#[derive(Debug, Clone, Copy)]
struct PipePair {
    x: f32,
    gap_y: f32,
}

impl PipePair {
    fn random<R: Rng + ?Sized>(x: f32, rng: &mut R) -> Self {
        let gap_y = rng.random_range(GAP_MARGIN..SCREEN_HEIGHT - GAP_MARGIN - GAP_HEIGHT);
        Self { x, gap_y }
    }

    fn hits(&self, bird_y: f32) -> bool {
        let overlaps_x = BIRD_X + BIRD_SIZE > self.x && BIRD_X < self.x + PIPE_WIDTH;
        let inside_gap = bird_y > self.gap_y && bird_y + BIRD_SIZE < self.gap_y + GAP_HEIGHT;
        overlaps_x && !inside_gap
    }
}

/// The game state for one bird.
#[derive(Debug, Clone)]
pub struct Flappy {
    bird_y: f32,
    velocity: f32,
    pipes: Vec<PipePair>,
    alive: bool,
    ticks: usize,
    // Gap positions drawn at reset, reused for recycled pipes.
    gaps: Vec<f32>,
    next_gap: usize,
}

impl Flappy {
    /// Creates a game; call [`Simulation::reset`] before the first tick.
    pub fn new() -> Self {
        Self {
            bird_y: BIRD_START_Y,
            velocity: 0.0,
            pipes: Vec::new(),
            alive: false,
            ticks: 0,
            gaps: Vec::new(),
            next_gap: 0,
        }
    }

    /// Next pipe the bird still has to clear.
    fn closest_pipe(&self) -> Option<&PipePair> {
        self.pipes
            .iter()
            .filter(|pipe| pipe.x + PIPE_WIDTH > BIRD_X)
            .min_by(|a, b| a.x.total_cmp(&b.x))
    }

    fn recycle_pipes(&mut self) {
        let rightmost = self.pipes.iter().map(|pipe| pipe.x).fold(f32::MIN, f32::max);
        let mut spawn_x = rightmost;
        for pipe in &mut self.pipes {
            if pipe.x + PIPE_WIDTH < 0.0 {
                spawn_x += PIPE_SPACING;
                pipe.x = spawn_x;
                pipe.gap_y = self.gaps[self.next_gap % self.gaps.len()];
                self.next_gap += 1;
            }
        }
    }
}

impl Default for Flappy {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation for Flappy {
    fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.bird_y = BIRD_START_Y;
        self.velocity = 0.0;
        self.alive = true;
        self.ticks = 0;
        self.pipes = (0..PIPE_COUNT)
            .map(|i| PipePair::random(PIPE_START_X + PIPE_SPACING * i as f32, rng))
            .collect();
        self.gaps = (0..PIPE_COUNT * 4)
            .map(|_| PipePair::random(0.0, rng).gap_y)
            .collect();
        self.next_gap = 0;
    }

    fn observe(&self) -> Vec<f32> {
        let (gap_y, pipe_x) = self
            .closest_pipe()
            .map_or((SCREEN_HEIGHT / 2.0, BIRD_X), |pipe| (pipe.gap_y, pipe.x));
        vec![
            (gap_y + GAP_HEIGHT / 2.0) / SCREEN_HEIGHT,
            (pipe_x - BIRD_X) / PIPE_SPACING,
            self.bird_y / SCREEN_HEIGHT,
        ]
    }

    fn act(&mut self, outputs: &[f32]) {
        if !self.alive {
            return;
        }

        if outputs.first().is_some_and(|&output| output > 0.5) {
            self.velocity = FLAP_VELOCITY;
        }
        self.velocity += GRAVITY;
        self.bird_y += self.velocity;

        for pipe in &mut self.pipes {
            pipe.x -= PIPE_SPEED;
        }
        self.recycle_pipes();
        self.ticks += 1;

        let off_screen = self.bird_y > SCREEN_HEIGHT || self.bird_y < -BIRD_SIZE;
        if off_screen || self.pipes.iter().any(|pipe| pipe.hits(self.bird_y)) {
            self.alive = false;
        }
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn fitness(&self) -> f32 {
        self.ticks as f32
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_bird_without_flapping_dies() {
        let mut game = Flappy::new();
        game.reset(&mut StdRng::seed_from_u64(0));

        let mut ticks = 0;
        while game.is_alive() && ticks < 1000 {
            game.act(&[0.0]);
            ticks += 1;
        }
        assert!(!game.is_alive());
        assert!(game.fitness() > 0.0);
    }

    #[test]
    fn test_observation_is_normalized() {
        let mut game = Flappy::new();
        game.reset(&mut StdRng::seed_from_u64(1));

        let observation = game.observe();
        assert_eq!(observation.len(), 3);
        assert!(observation.iter().all(|value| (0.0..=2.0).contains(value)));
    }

    #[test]
    fn test_reset_revives_bird() {
        let mut game = Flappy::new();
        let mut rng = StdRng::seed_from_u64(2);
        game.reset(&mut rng);
        while game.is_alive() {
            game.act(&[0.0]);
        }

        game.reset(&mut rng);
        assert!(game.is_alive());
        assert_eq!(game.fitness(), 0.0);
    }

    #[test]
    fn test_pipes_are_recycled() {
        let mut game = Flappy::new();
        game.reset(&mut StdRng::seed_from_u64(3));
        for _ in 0..200 {
            for pipe in &mut game.pipes {
                pipe.x -= PIPE_SPEED;
            }
            game.recycle_pipes();
        }
        assert_eq!(game.pipes.len(), PIPE_COUNT);
        assert!(game.pipes.iter().all(|pipe| pipe.x + PIPE_WIDTH >= 0.0));
    }
}
