//! Reproducible draws for inter-arrival and service durations.
//!
//! Draw order is part of the reproducibility contract: one inter-arrival draw
//! for every arrival that gets scheduled (including the first), and one
//! service draw at the moment a customer is assigned a server. With
//! [`ExponentialSampler::InverseTransform`] each draw consumes exactly one
//! `f64` from a `StdRng` seeded through `SeedableRng::seed_from_u64`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

use super::config::{ExponentialSampler, ServiceDistribution, SimulationParams};
use super::error::{SimulationError, SimulationResult};
use super::types::SimTime;

/// Source of the durations that drive a run
///
/// `RandomStream` is the production implementation. Each runner owns exactly one source.
pub trait DrawSource {
    /// Time until the next arrival
    fn next_interarrival_time(&mut self) -> SimulationResult<SimTime>;

    /// Service duration for a customer being assigned a server now
    fn next_service_time(&mut self) -> SimulationResult<SimTime>;
}

impl<T: DrawSource + ?Sized> DrawSource for &mut T {
    fn next_interarrival_time(&mut self) -> SimulationResult<SimTime> {
        (**self).next_interarrival_time()
    }

    fn next_service_time(&mut self) -> SimulationResult<SimTime> {
        (**self).next_service_time()
    }
}

/// Seeded exponential draw stream owned by a single run
pub struct RandomStream {
    rng: StdRng,
    seed: u64,
    arrival_rate: f64,
    service_time: f64,
    service_distribution: ServiceDistribution,
    sampler: ExponentialSampler,
}

impl RandomStream {
    /// Create a stream with exponential service and the inverse-transform sampler
    pub fn new(seed: u64, arrival_rate: f64, service_time: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            arrival_rate,
            service_time,
            service_distribution: ServiceDistribution::default(),
            sampler: ExponentialSampler::default(),
        }
    }

    /// Create the stream described by `params`
    ///
    /// Without a configured seed a fresh one is drawn from entropy; it is still
    /// reported by [`RandomStream::seed`] so the run can be replayed.
    pub fn from_params(params: &SimulationParams) -> Self {
        let seed = params.random_seed.unwrap_or_else(rand::random::<u64>);
        Self::new(seed, params.arrival_rate, params.service_time)
            .with_service_distribution(params.service_distribution)
            .with_sampler(params.sampler)
    }

    pub fn with_service_distribution(mut self, distribution: ServiceDistribution) -> Self {
        self.service_distribution = distribution;
        self
    }

    pub fn with_sampler(mut self, sampler: ExponentialSampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Seed the stream was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn sample_exponential(&mut self, rate: f64) -> SimulationResult<SimTime> {
        match self.sampler {
            ExponentialSampler::InverseTransform => {
                // u in [0, 1) so 1 - u is never 0
                let u: f64 = self.rng.gen();
                Ok(-(1.0 - u).ln() / rate)
            }
            ExponentialSampler::Ziggurat => {
                let exp = Exp::new(rate).map_err(|e| {
                    SimulationError::invalid("rate", format!("{} (rate {})", e, rate))
                })?;
                Ok(exp.sample(&mut self.rng))
            }
        }
    }
}

impl DrawSource for RandomStream {
    fn next_interarrival_time(&mut self) -> SimulationResult<SimTime> {
        if self.arrival_rate.is_nan() || self.arrival_rate <= 0.0 {
            return Err(SimulationError::invalid(
                "arrival_rate",
                format!("must be > 0, got {}", self.arrival_rate),
            ));
        }
        self.sample_exponential(self.arrival_rate)
    }

    fn next_service_time(&mut self) -> SimulationResult<SimTime> {
        if self.service_time.is_nan() || self.service_time <= 0.0 {
            return Err(SimulationError::invalid(
                "service_time",
                format!("must be > 0, got {}", self.service_time),
            ));
        }
        match self.service_distribution {
            ServiceDistribution::Deterministic => Ok(self.service_time),
            ServiceDistribution::Exponential => match self.sampler {
                // Scale by the mean rather than dividing by 1 / mean
                ExponentialSampler::InverseTransform => {
                    let u: f64 = self.rng.gen();
                    Ok(-(1.0 - u).ln() * self.service_time)
                }
                ExponentialSampler::Ziggurat => self.sample_exponential(1.0 / self.service_time),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomStream::new(42, 5.0, 3.0);
        let mut b = RandomStream::new(42, 5.0, 3.0);
        for _ in 0..100 {
            assert_eq!(
                a.next_interarrival_time().unwrap().to_bits(),
                b.next_interarrival_time().unwrap().to_bits()
            );
            assert_eq!(
                a.next_service_time().unwrap().to_bits(),
                b.next_service_time().unwrap().to_bits()
            );
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = RandomStream::new(1, 1.0, 1.0);
        let mut b = RandomStream::new(2, 1.0, 1.0);
        let xs: Vec<f64> = (0..8).map(|_| a.next_interarrival_time().unwrap()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.next_interarrival_time().unwrap()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_inverse_transform_matches_uniform_draws() {
        let mut stream = RandomStream::new(9, 4.0, 2.0);
        let mut rng = StdRng::seed_from_u64(9);

        let u: f64 = rng.gen();
        assert_eq!(stream.next_interarrival_time().unwrap(), -(1.0 - u).ln() / 4.0);
        let u: f64 = rng.gen();
        assert_eq!(stream.next_service_time().unwrap(), -(1.0 - u).ln() * 2.0);
    }

    #[test]
    fn test_sample_means_are_close() {
        let mut stream = RandomStream::new(2024, 5.0, 3.0);
        let n = 200_000;
        let arrivals: f64 = (0..n).map(|_| stream.next_interarrival_time().unwrap()).sum();
        let services: f64 = (0..n).map(|_| stream.next_service_time().unwrap()).sum();

        assert!((arrivals / n as f64 - 0.2).abs() < 0.005);
        assert!((services / n as f64 - 3.0).abs() < 0.05);
    }

    #[test]
    fn test_ziggurat_sampler_mean() {
        let mut stream =
            RandomStream::new(77, 2.0, 1.0).with_sampler(ExponentialSampler::Ziggurat);
        let n = 200_000;
        let total: f64 = (0..n).map(|_| stream.next_interarrival_time().unwrap()).sum();
        assert!((total / n as f64 - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_draws_are_non_negative() {
        let mut stream = RandomStream::new(5, 10.0, 0.1);
        for _ in 0..10_000 {
            assert!(stream.next_interarrival_time().unwrap() >= 0.0);
            assert!(stream.next_service_time().unwrap() >= 0.0);
        }
    }

    #[test]
    fn test_deterministic_service_consumes_no_draws() {
        let mut fixed = RandomStream::new(11, 1.0, 3.0)
            .with_service_distribution(ServiceDistribution::Deterministic);
        let mut reference = RandomStream::new(11, 1.0, 3.0);

        assert_eq!(fixed.next_service_time().unwrap(), 3.0);
        assert_eq!(fixed.next_service_time().unwrap(), 3.0);
        assert_eq!(
            fixed.next_interarrival_time().unwrap(),
            reference.next_interarrival_time().unwrap()
        );
    }

    #[test]
    fn test_invalid_rates_are_rejected() {
        let mut stream = RandomStream::new(1, 0.0, -1.0);
        assert!(matches!(
            stream.next_interarrival_time(),
            Err(SimulationError::InvalidParameter { name: "arrival_rate", .. })
        ));
        assert!(matches!(
            stream.next_service_time(),
            Err(SimulationError::InvalidParameter { name: "service_time", .. })
        ));
    }

    #[test]
    fn test_from_params_without_seed_reports_seed() {
        let params = SimulationParams::default().without_seed();
        let stream = RandomStream::from_params(&params);
        let mut replay = RandomStream::new(stream.seed(), params.arrival_rate, params.service_time);
        let mut stream = stream;
        assert_eq!(
            stream.next_interarrival_time().unwrap(),
            replay.next_interarrival_time().unwrap()
        );
    }
}
