//! Mixed-polarity controls built from positive-control primitives.
//!
//! Off-controls are realized with the flip-flop bracket: every control whose
//! mask bit is `false` is NOT-ed, the gate runs with all-positive controls,
//! and the same controls are NOT-ed back. [`ControlScope`] owns the flipped
//! state and restores it on every exit path, including errors returned by
//! the gate body and unwinding.

use qwalk_sim::{Backend, Gate, QubitId, SimResult};
use tracing::warn;

use crate::error::{ArithError, ArithResult};

/// Flipped off-controls held for the duration of a gate body.
///
/// While the scope is alive every control reads `|1⟩` exactly on the
/// subspace selected by the original mask. Dropping the scope un-flips them;
/// [`release`](Self::release) does the same but reports backend failures.
pub struct ControlScope<'a, B: Backend + ?Sized> {
    backend: &'a mut B,
    flipped: Vec<QubitId>,
}

impl<'a, B: Backend + ?Sized> ControlScope<'a, B> {
    /// Flip every control whose mask bit is `false`.
    ///
    /// If a flip fails, the controls flipped so far are restored before the
    /// error is returned.
    pub fn acquire(backend: &'a mut B, controls: &[QubitId], mask: &[bool]) -> ArithResult<Self> {
        if controls.len() != mask.len() {
            return Err(ArithError::MaskLengthMismatch {
                mask: mask.len(),
                controls: controls.len(),
            });
        }

        let mut scope = Self {
            backend,
            flipped: Vec::with_capacity(mask.iter().filter(|on| !**on).count()),
        };
        for (&qubit, &on) in controls.iter().zip(mask) {
            if !on {
                scope.backend.x(qubit)?;
                scope.flipped.push(qubit);
            }
        }
        Ok(scope)
    }

    /// The backend, for applying gates inside the scope.
    pub fn backend(&mut self) -> &mut B {
        &mut *self.backend
    }

    /// Controls currently held flipped.
    pub fn flipped(&self) -> &[QubitId] {
        &self.flipped
    }

    /// Un-flip the held controls.
    pub fn release(mut self) -> ArithResult<()> {
        self.restore()?;
        Ok(())
    }

    fn restore(&mut self) -> SimResult<()> {
        while let Some(&qubit) = self.flipped.last() {
            self.backend.x(qubit)?;
            self.flipped.pop();
        }
        Ok(())
    }
}

impl<B: Backend + ?Sized> Drop for ControlScope<'_, B> {
    fn drop(&mut self) {
        if self.flipped.is_empty() {
            return;
        }
        if let Err(err) = self.restore() {
            warn!(
                %err,
                remaining = self.flipped.len(),
                "failed to restore flipped control qubits"
            );
        }
    }
}

/// Run `body` with `controls` flipped so that the mask reads as all-positive.
///
/// The controls are restored whether `body` succeeds or not; an error from
/// `body` takes precedence over one from the restore.
pub fn with_controls<B, T, F>(
    backend: &mut B,
    controls: &[QubitId],
    mask: &[bool],
    body: F,
) -> ArithResult<T>
where
    B: Backend + ?Sized,
    F: FnOnce(&mut B) -> ArithResult<T>,
{
    let mut scope = ControlScope::acquire(backend, controls, mask)?;
    let result = body(scope.backend());
    let released = scope.release();
    let value = result?;
    released?;
    Ok(value)
}

/// Apply `gate` to `targets` where each control equals its mask bit.
///
/// This is the generic control: mixed polarities are reduced to the
/// all-positive multi-controlled primitive through a [`ControlScope`].
pub fn controlled<B: Backend + ?Sized>(
    backend: &mut B,
    gate: Gate,
    targets: &[QubitId],
    controls: &[QubitId],
    mask: &[bool],
) -> ArithResult<()> {
    let all_on = vec![true; controls.len()];
    with_controls(backend, controls, mask, |b| {
        b.apply_controlled(gate, targets, controls, &all_on)?;
        Ok(())
    })
}

/// Prepend `outer` positive controls to an inner control list and mask.
pub(crate) fn join_controls(
    outer: &[QubitId],
    inner: impl IntoIterator<Item = (QubitId, bool)>,
) -> (Vec<QubitId>, Vec<bool>) {
    let mut controls = outer.to_vec();
    let mut mask = vec![true; outer.len()];
    for (qubit, on) in inner {
        controls.push(qubit);
        mask.push(on);
    }
    (controls, mask)
}
