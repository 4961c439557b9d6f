//! Miscellaneous tools.

use std::{ fmt, sync::Arc };
use ndarray::{ self as nd, Ix1, concatenate };
use num_complex::Complex64 as C64;
use num_traits::Zero;
use rustfft::{ Fft, FftPlanner };

/// Calculate the norm of a wavefunction sampled on a periodic grid with
/// spacing `dx`.
pub fn wf_norm<S>(q: &nd::ArrayBase<S, Ix1>, dx: f64) -> f64
where S: nd::Data<Elem = C64>
{
    dx * q.iter().map(|qk| qk.norm_sqr()).sum::<f64>()
}

/// Calculate the inner product ⟨q|p⟩ of two wavefunctions sampled on a
/// periodic grid with spacing `dx`.
pub fn wf_dot<S, T>(
    q: &nd::ArrayBase<S, Ix1>,
    p: &nd::ArrayBase<T, Ix1>,
    dx: f64,
) -> C64
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = C64>,
{
    q.iter().zip(p)
        .fold(C64::zero(), |acc, (qk, pk)| acc + qk.conj() * pk)
        * dx
}

/// Renormalize a wavefunction in place.
pub fn wf_renormalize<S>(q: &mut nd::ArrayBase<S, Ix1>, dx: f64)
where S: nd::DataMut<Elem = C64>
{
    let norm = wf_norm(q, dx).sqrt();
    q.iter_mut().for_each(|qk| { *qk /= norm; });
}

/// Generate an array of frequency-space coordinates to accompany a FFT of `n`
/// points for sampling interval `dt`.
pub fn fft_freq(n: usize, dt: f64) -> nd::Array1<f64> {
    if n % 2 == 0 {
        let fp: nd::Array1<f64>
            = (0..n / 2)
            .map(|k| k as f64 / (n as f64 * dt))
            .collect();
        let fm: nd::Array1<f64>
            = (1..n / 2 + 1).rev()
            .map(|k| -(k as f64) / (n as f64 * dt))
            .collect();
        concatenate!(nd::Axis(0), fp, fm)
    } else {
        let fp: nd::Array1<f64>
            = (0..(n + 1) / 2)
            .map(|k| k as f64 / (n as f64 * dt))
            .collect();
        let fm: nd::Array1<f64>
            = (1..(n + 1) / 2).rev()
            .map(|k| -(k as f64) / (n as f64 * dt))
            .collect();
        concatenate!(nd::Axis(0), fp, fm)
    }
}

/// Forward and inverse FFT plans for a fixed length, planned once.
///
/// The inverse transform is normalized, so that a forward transform followed
/// by an inverse one is the identity.
#[derive(Clone)]
pub struct FftPair {
    n: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for FftPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftPair").field("n", &self.n).finish()
    }
}

impl FftPair {
    /// Plan transforms of length `n`.
    pub fn new(n: usize) -> Self {
        let mut plan = FftPlanner::new();
        let forward = plan.plan_fft_forward(n);
        let inverse = plan.plan_fft_inverse(n);
        Self { n, forward, inverse }
    }

    /// Return the transform length.
    pub fn len(&self) -> usize { self.n }

    /// Return `true` if the transform length is zero.
    pub fn is_empty(&self) -> bool { self.n == 0 }

    /// Perform the forward transform in place.
    ///
    /// *Panics if `x` is not contiguous or has the wrong length*.
    pub fn fft_inplace<S>(&self, x: &mut nd::ArrayBase<S, Ix1>)
    where S: nd::DataMut<Elem = C64>
    {
        assert_eq!(x.len(), self.n);
        self.forward.process(x.as_slice_mut().expect("contiguous array"));
    }

    /// Perform the normalized inverse transform in place.
    ///
    /// *Panics if `x` is not contiguous or has the wrong length*.
    pub fn ifft_inplace<S>(&self, x: &mut nd::ArrayBase<S, Ix1>)
    where S: nd::DataMut<Elem = C64>
    {
        assert_eq!(x.len(), self.n);
        self.inverse.process(x.as_slice_mut().expect("contiguous array"));
        let n = self.n as f64;
        x.map_inplace(|xk| { *xk /= n; });
    }

    /// Return the forward transform of `x`.
    pub fn fft<S>(&self, x: &nd::ArrayBase<S, Ix1>) -> nd::Array1<C64>
    where S: nd::Data<Elem = C64>
    {
        let mut f: nd::Array1<C64> = x.iter().copied().collect();
        self.fft_inplace(&mut f);
        f
    }

    /// Return the normalized inverse transform of `f`.
    pub fn ifft<S>(&self, f: &nd::ArrayBase<S, Ix1>) -> nd::Array1<C64>
    where S: nd::Data<Elem = C64>
    {
        let mut x: nd::Array1<C64> = f.iter().copied().collect();
        self.ifft_inplace(&mut x);
        x
    }
}
