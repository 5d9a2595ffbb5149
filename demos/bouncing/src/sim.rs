use anyhow::Result;
use engine_app::Simulation;
use engine_component::Component;
use engine_ecs::{Entity, Query, World};
use engine_platform::{Canvas, Clip, Input, Key, NullAudio, Sprite};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tracing::debug;

pub const SPACE: Key = Key(32);
pub const BACKSPACE: Key = Key(8);

const BACKGROUND: u32 = 0xFF10_1018;
const BALL_SIZE: u32 = 4;
const MAX_SPEED: f32 = 60.0;
const SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity(pub Vec2);

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }
}

/// Balls spawned from input rather than `init`. They flash while
/// `remaining > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub remaining: f32,
}

impl Component for Highlight {
    fn type_name() -> &'static str {
        "Highlight"
    }
}

pub struct Bouncing {
    world: World,
    input: Input,
    bounds: Vec2,
    initial: u32,
    /// Fixed seed so runs are reproducible.
    rng: Xoshiro256StarStar,
    ball: Sprite,
    flash: Sprite,
    bounce: Clip,
    audio: NullAudio,
}

impl Bouncing {
    pub fn new(initial: u32, width: u32, height: u32, input: Input) -> Result<Self> {
        Ok(Self {
            world: World::new(),
            input,
            bounds: Vec2::new(
                width.saturating_sub(BALL_SIZE) as f32,
                height.saturating_sub(BALL_SIZE) as f32,
            ),
            initial,
            rng: Xoshiro256StarStar::seed_from_u64(SEED),
            ball: Sprite::solid(BALL_SIZE, BALL_SIZE, 0xFFE0_C040)?,
            flash: Sprite::solid(BALL_SIZE, BALL_SIZE, 0xFFFF_FFFF)?,
            bounce: Clip::with_gain(vec![0.0; 256], 22_050, 0.5),
            audio: NullAudio::new(),
        })
    }

    fn spawn(&mut self, at: Vec2) -> Result<Entity> {
        let velocity = Vec2::new(
            self.rng.gen_range(-MAX_SPEED..MAX_SPEED),
            self.rng.gen_range(-MAX_SPEED..MAX_SPEED),
        );
        let entity = self.world.create()?;
        self.world.attach(entity, Position(at.clamp(Vec2::ZERO, self.bounds)))?;
        self.world.attach(entity, Velocity(velocity))?;
        Ok(entity)
    }

    fn handle_input(&mut self) -> Result<()> {
        if self.input.key_pressed(SPACE) {
            let (x, y) = self.input.pointer();
            let entity = self.spawn(Vec2::new(x, y))?;
            self.world.attach(entity, Highlight { remaining: 0.5 })?;
            debug!(%entity, "spawned from input");
        }
        if self.input.key_pressed(BACKSPACE) {
            let oldest = self.world.entities().next();
            if let Some(oldest) = oldest {
                self.world.destroy(oldest)?;
            }
        }
        Ok(())
    }
}

impl Simulation for Bouncing {
    fn init(&mut self) -> Result<()> {
        for _ in 0..self.initial {
            let at = Vec2::new(
                self.rng.gen_range(0.0..=self.bounds.x),
                self.rng.gen_range(0.0..=self.bounds.y),
            );
            self.spawn(at)?;
        }
        debug!(entities = self.world.entity_count(), "world populated");
        Ok(())
    }

    fn update(&mut self, dt: f64) -> Result<()> {
        self.handle_input()?;
        let dt = dt as f32;

        let moving = Query::new().with::<Position>().with::<Velocity>();
        for entity in self.world.query(&moving) {
            let mut velocity = self.world.get::<Velocity>(entity)?.0;
            let position = &mut self.world.get_mut::<Position>(entity)?.0;
            *position += velocity * dt;

            let mut bounced = false;
            for axis in 0..2 {
                if position[axis] < 0.0 || position[axis] > self.bounds[axis] {
                    position[axis] = position[axis].clamp(0.0, self.bounds[axis]);
                    velocity[axis] = -velocity[axis];
                    bounced = true;
                }
            }
            if bounced {
                self.world.get_mut::<Velocity>(entity)?.0 = velocity;
                self.bounce.play(&self.audio, velocity.length() / MAX_SPEED)?;
            }
        }

        for entity in self.world.query(&Query::new().with::<Highlight>()) {
            let highlight = self.world.get_mut::<Highlight>(entity)?;
            highlight.remaining -= dt;
            if highlight.remaining <= 0.0 {
                self.world.detach::<Highlight>(entity);
            }
        }
        Ok(())
    }

    fn draw(&mut self, canvas: &mut Canvas) -> Result<()> {
        canvas.clear(BACKGROUND);
        for (entity, Position(at)) in self.world.iter::<Position>() {
            let sprite = if self.world.has::<Highlight>(entity) {
                &self.flash
            } else {
                &self.ball
            };
            canvas.blit(sprite, at.x as i32, at.y as i32);
        }
        Ok(())
    }
}
