use crate::Particle;

/// Owns the canonical sequence of particles of a simulation.
///
/// The order of the particles carries no physical meaning but is stable,
/// which keeps pair enumeration deterministic for tests. The container is
/// only resized between steps (setup, outflow removal), never while a pair
/// iteration is in progress.
#[derive(Clone, Debug, Default)]
pub struct ParticleContainer {
    /// Particles that exist right now.
    pub particles: Vec<Particle>,
}

impl ParticleContainer {
    pub fn new() -> Self {
        ParticleContainer { particles: vec![] }
    }

    pub fn with_particles(particles: Vec<Particle>) -> Self {
        ParticleContainer { particles }
    }

    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    /// Returns mutable references to two distinct particles.
    ///
    /// # Panics
    ///
    /// Panics if `i == j` or either index is out of bounds.
    pub fn get_pair_mut(&mut self, i: usize, j: usize) -> (&mut Particle, &mut Particle) {
        assert_ne!(i, j, "a particle cannot pair with itself");
        if i < j {
            let (head, tail) = self.particles.split_at_mut(j);
            (&mut head[i], &mut tail[0])
        } else {
            let (head, tail) = self.particles.split_at_mut(i);
            let (second, first) = (&mut head[j], &mut tail[0]);
            (first, second)
        }
    }

    /// Calls `f` for every unordered pair of distinct particles exactly
    /// once, in a stable order. Used by the brute-force kernels where no
    /// spatial pruning is wanted.
    pub fn for_each_pair<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Particle, &mut Particle),
    {
        for j in 1..self.particles.len() {
            let (head, tail) = self.particles.split_at_mut(j);
            let second = &mut tail[0];
            for first in head.iter_mut() {
                f(first, second);
            }
        }
    }

    /// Keeps only the particles for which `predicate` holds. Invalidates
    /// all indices held elsewhere, so this runs only between steps.
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: FnMut(&Particle) -> bool,
    {
        self.particles.retain(predicate);
    }
}
