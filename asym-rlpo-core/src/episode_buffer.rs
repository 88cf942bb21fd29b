//! A buffer of whole episodes bounded by the total number of interaction steps.
mod config;
use crate::Episode;
pub use config::EpisodeBufferConfig;
use log::trace;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

/// Stores complete episodes up to a maximum number of interaction steps.
///
/// Episodes are admitted atomically. When an appended episode makes the total
/// number of interactions exceed the capacity, the oldest episodes are evicted
/// until it fits. An episode longer than the capacity itself is discarded and
/// leaves the buffer untouched. Neither case is an error.
///
/// Appending takes `&mut self`, so writers are serialized. Sampling takes
/// `&self` and may run under a shared read lock: to share a buffer among
/// collector and learner threads, wrap it in `Arc<RwLock<_>>`.
pub struct EpisodeBuffer<S, O> {
    max_timesteps: usize,
    episodes: VecDeque<Episode<S, O>>,
    num_interactions: usize,
    rng: Mutex<StdRng>,
}

impl<S, O> EpisodeBuffer<S, O> {
    /// Builds an empty buffer.
    pub fn build(config: &EpisodeBufferConfig) -> Self {
        Self {
            max_timesteps: config.max_timesteps,
            episodes: VecDeque::new(),
            num_interactions: 0,
            rng: Mutex::new(StdRng::seed_from_u64(config.seed)),
        }
    }

    /// Builds an empty buffer with the given capacity and the default seed.
    pub fn new(max_timesteps: usize) -> Self {
        Self::build(&EpisodeBufferConfig::default().max_timesteps(max_timesteps))
    }

    /// Appends an episode, evicting the oldest ones to respect the capacity.
    pub fn append_episode(&mut self, episode: Episode<S, O>) {
        let len = episode.len();
        if len > self.max_timesteps {
            trace!(
                "Discard episode of length {} exceeding capacity {}",
                len,
                self.max_timesteps
            );
            return;
        }

        self.episodes.push_back(episode);
        self.num_interactions += len;

        while self.num_interactions > self.max_timesteps {
            // The new episode alone fits, so the loop stops before reaching it.
            if let Some(evicted) = self.episodes.pop_front() {
                trace!("Evict episode of length {}", evicted.len());
                self.num_interactions -= evicted.len();
            }
        }
    }

    /// Returns the total number of interaction steps of the held episodes.
    pub fn num_interactions(&self) -> usize {
        self.num_interactions
    }

    /// Returns the number of held episodes.
    pub fn num_episodes(&self) -> usize {
        self.episodes.len()
    }

    /// Returns the capacity in interaction steps.
    pub fn capacity(&self) -> usize {
        self.max_timesteps
    }

    /// Returns `true` if no episode is held.
    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Iterates over the held episodes, oldest first.
    pub fn episodes(&self) -> impl Iterator<Item = &Episode<S, O>> {
        self.episodes.iter()
    }

    // The RNG state stays valid if a sampler panicked while holding the lock.
    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Draws one episode uniformly at random.
    pub fn sample_episode(&self) -> Option<&Episode<S, O>> {
        if self.episodes.is_empty() {
            return None;
        }
        let ix = self.rng().gen_range(0..self.episodes.len());
        self.episodes.get(ix)
    }

    /// Draws `n` episodes uniformly at random with replacement.
    ///
    /// Returns an empty vector if the buffer is empty.
    pub fn sample_episodes(&self, n: usize) -> Vec<&Episode<S, O>> {
        if self.episodes.is_empty() {
            return vec![];
        }
        let len = self.episodes.len();
        let mut rng = self.rng();
        let episodes = (0..n)
            .map(|_| &self.episodes[rng.gen_range(0..len)])
            .collect();
        episodes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn make_episode(num_timesteps: usize) -> Episode<f32, f32> {
        Episode::new(
            vec![0.0; num_timesteps],
            vec![0.0; num_timesteps],
            vec![0; num_timesteps],
            vec![0.0; num_timesteps],
        )
        .unwrap()
    }

    fn sum_of_lengths(buffer: &EpisodeBuffer<f32, f32>) -> usize {
        buffer.episodes().map(|e| e.len()).sum()
    }

    #[test]
    fn test_episode_buffer_max_timesteps() {
        let mut buffer = EpisodeBuffer::new(100);
        assert_eq!(buffer.num_interactions(), 0);
        assert_eq!(buffer.num_episodes(), 0);

        let expected = [(101, 0, 0), (10, 10, 1), (20, 30, 2), (80, 100, 2), (1, 81, 2)];
        for &(len, num_interactions, num_episodes) in expected.iter() {
            buffer.append_episode(make_episode(len));
            assert_eq!(buffer.num_interactions(), num_interactions);
            assert_eq!(buffer.num_episodes(), num_episodes);
        }

        // The survivors are the two most recent episodes.
        let lens = buffer.episodes().map(|e| e.len()).collect::<Vec<_>>();
        assert_eq!(lens, vec![80, 1]);
    }

    #[test]
    fn test_exact_fit_is_not_evicted() {
        let mut buffer = EpisodeBuffer::new(30);
        buffer.append_episode(make_episode(10));
        buffer.append_episode(make_episode(20));
        assert_eq!(buffer.num_interactions(), 30);
        assert_eq!(buffer.num_episodes(), 2);
    }

    #[test]
    fn test_large_episode_evicts_several() {
        let mut buffer = EpisodeBuffer::new(10);
        for _ in 0..5 {
            buffer.append_episode(make_episode(2));
        }
        buffer.append_episode(make_episode(9));
        assert_eq!(buffer.num_episodes(), 1);
        assert_eq!(buffer.num_interactions(), 9);
    }

    #[test]
    fn test_oversized_episode_is_noop() {
        let mut buffer = EpisodeBuffer::new(10);
        buffer.append_episode(make_episode(4));
        buffer.append_episode(make_episode(5));
        buffer.append_episode(make_episode(11));
        assert_eq!(buffer.num_interactions(), 9);
        assert_eq!(buffer.num_episodes(), 2);
        let lens = buffer.episodes().map(|e| e.len()).collect::<Vec<_>>();
        assert_eq!(lens, vec![4, 5]);
    }

    #[test]
    fn test_running_total_matches_lengths() {
        let mut rng = StdRng::seed_from_u64(0);
        for &capacity in [1usize, 7, 50, 100].iter() {
            let mut buffer = EpisodeBuffer::new(capacity);
            for _ in 0..200 {
                let len = rng.gen_range(1..=capacity + 5);
                buffer.append_episode(make_episode(len));
                assert_eq!(buffer.num_interactions(), sum_of_lengths(&buffer));
                assert!(buffer.num_interactions() <= capacity);
            }
        }
    }

    #[test]
    fn test_sample_episode() {
        let mut buffer = EpisodeBuffer::<f32, f32>::new(100);
        assert!(buffer.sample_episode().is_none());
        assert!(buffer.sample_episodes(3).is_empty());

        buffer.append_episode(make_episode(3));
        buffer.append_episode(make_episode(5));
        for _ in 0..10 {
            let len = buffer.sample_episode().map(|e| e.len());
            assert!(len == Some(3) || len == Some(5));
        }
        assert_eq!(buffer.sample_episodes(4).len(), 4);
    }

    #[test]
    fn test_sampling_is_seeded() {
        let config = EpisodeBufferConfig::default().max_timesteps(100).seed(7);
        let mut b1 = EpisodeBuffer::<f32, f32>::build(&config);
        let mut b2 = EpisodeBuffer::<f32, f32>::build(&config);
        for len in 1..=10 {
            b1.append_episode(make_episode(len));
            b2.append_episode(make_episode(len));
        }

        // shared references only
        let (b1, b2) = (&b1, &b2);
        let lens1 = b1.sample_episodes(20).iter().map(|e| e.len()).collect::<Vec<_>>();
        let lens2 = b2.sample_episodes(20).iter().map(|e| e.len()).collect::<Vec<_>>();
        assert_eq!(lens1, lens2);
    }
}
