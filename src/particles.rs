use rand::Rng;

use crate::battle::ParticleKind;

const BURST_SIZE: usize = 12;

/// A single short-lived burst fragment.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    vel_x: f64,
    vel_y: f64,
    pub kind: ParticleKind,
    age: f64,
    max_age: f64,
}

impl Particle {
    fn new<R: Rng>(x: f64, y: f64, kind: ParticleKind, rng: &mut R) -> Self {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let speed = rng.gen_range(6.0..14.0);

        Self {
            x,
            y,
            vel_x: angle.cos() * speed,
            // terminal cells are roughly twice as tall as wide
            vel_y: angle.sin() * speed * 0.5,
            kind,
            age: 0.0,
            max_age: rng.gen_range(0.5..0.8),
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.age += dt;
        self.age < self.max_age
    }

    pub fn symbol(&self) -> char {
        match self.kind {
            ParticleKind::Slash => '/',
            ParticleKind::Spark => '*',
        }
    }
}

/// All live particles. Bursts overlay the battle view and age out on ticks.
#[derive(Debug, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    /// Scatters one burst outward from `(x, y)`.
    pub fn burst(&mut self, kind: ParticleKind, x: f64, y: f64) {
        let mut rng = rand::thread_rng();
        for _ in 0..BURST_SIZE {
            self.particles.push(Particle::new(x, y, kind, &mut rng));
        }
    }

    pub fn update(&mut self, dt: f64) {
        self.particles.retain_mut(|p| p.update(dt));
    }

    pub fn is_active(&self) -> bool {
        !self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
