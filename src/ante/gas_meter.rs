use strum::Display;
use thiserror::Error;

/// What a unit of gas consumption was charged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum GasKind {
    /// Constant per-byte pre-charge for the encoded transaction.
    TxSize,
    /// Constant per-signature pre-charge ahead of verification.
    SignatureVerification,
    /// The dynamically computed commission itself. The only kind a bounded
    /// meter accounts.
    Commission,
}

/// Gas limit exceeded, or the running total overflowed 64 bits.
///
/// An ordinary error value, not a panic: the chain executor propagates it
/// like any other rejection and reports the wanted/used figures to the
/// client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("out of gas in {kind}: gas wanted {wanted}, gas used {used}")]
pub struct OutOfGas {
    pub kind: GasKind,
    pub wanted: u64,
    pub used: u64,
}

/// Tracks gas consumed against a limit for one transaction's admission.
///
/// The bounded meter is not a general resource-accounting primitive: it
/// accounts [`GasKind::Commission`] only and treats every other kind as a
/// no-op. Its sole job is enforcing that the computed commission fits the
/// gas limit ultimately assigned to the transaction. The infinite meter
/// (genesis processing and pure simulation) records everything and never
/// rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasMeter {
    Infinite { consumed: u64 },
    Bounded { limit: u64, consumed: u64 },
}

impl GasMeter {
    pub fn infinite() -> Self {
        Self::Infinite { consumed: 0 }
    }

    pub fn bounded(limit: u64) -> Self {
        Self::Bounded { limit, consumed: 0 }
    }

    /// Record `amount` of consumption attributed to `kind`.
    ///
    /// On a bounded meter, untracked kinds return `Ok` without accounting.
    /// A tracked addition that overflows `u64` or lands strictly above the
    /// limit leaves the meter untouched and reports [`OutOfGas`].
    pub fn consume(&mut self, amount: u64, kind: GasKind) -> Result<(), OutOfGas> {
        match self {
            Self::Infinite { consumed } => {
                *consumed = consumed.saturating_add(amount);
                Ok(())
            }
            Self::Bounded { limit, consumed } => {
                if kind != GasKind::Commission {
                    return Ok(());
                }
                let updated = consumed.checked_add(amount).ok_or(OutOfGas {
                    kind,
                    wanted: *limit,
                    used: u64::MAX,
                })?;
                if updated > *limit {
                    return Err(OutOfGas {
                        kind,
                        wanted: *limit,
                        used: updated,
                    });
                }
                *consumed = updated;
                Ok(())
            }
        }
    }

    pub fn gas_consumed(&self) -> u64 {
        match self {
            Self::Infinite { consumed } | Self::Bounded { consumed, .. } => *consumed,
        }
    }

    /// The configured limit; an infinite meter reports `u64::MAX`.
    pub fn gas_limit(&self) -> u64 {
        match self {
            Self::Infinite { .. } => u64::MAX,
            Self::Bounded { limit, .. } => *limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prop_assert;
    use proptest::prop_assert_eq;
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn bounded_meter_ignores_untracked_kinds() {
        let mut meter = GasMeter::bounded(10);
        meter.consume(1_000_000, GasKind::TxSize).unwrap();
        meter
            .consume(1_000_000, GasKind::SignatureVerification)
            .unwrap();
        assert_eq!(meter.gas_consumed(), 0);
    }

    #[test]
    fn consumption_at_exactly_the_limit_succeeds() {
        let mut meter = GasMeter::bounded(10);
        meter.consume(10, GasKind::Commission).unwrap();
        assert_eq!(meter.gas_consumed(), 10);
    }

    #[test]
    fn exceeding_the_limit_reports_wanted_and_used() {
        let mut meter = GasMeter::bounded(10);
        meter.consume(6, GasKind::Commission).unwrap();
        let err = meter.consume(5, GasKind::Commission).unwrap_err();
        assert_eq!(
            err,
            OutOfGas {
                kind: GasKind::Commission,
                wanted: 10,
                used: 11,
            }
        );
        // The failed addition is not recorded.
        assert_eq!(meter.gas_consumed(), 6);
    }

    #[test]
    fn infinite_meter_records_everything_and_never_fails() {
        let mut meter = GasMeter::infinite();
        meter.consume(u64::MAX, GasKind::TxSize).unwrap();
        meter.consume(u64::MAX, GasKind::Commission).unwrap();
        assert_eq!(meter.gas_consumed(), u64::MAX);
        assert_eq!(meter.gas_limit(), u64::MAX);
    }

    #[proptest]
    fn sum_overflow_is_out_of_gas_never_a_wrapped_value(
        #[strategy(1u64..)] first: u64,
        #[strategy(1u64..)] second: u64,
    ) {
        let mut meter = GasMeter::bounded(u64::MAX);
        meter.consume(first, GasKind::Commission).unwrap();
        let result = meter.consume(second, GasKind::Commission);
        match first.checked_add(second) {
            Some(sum) => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(meter.gas_consumed(), sum);
            }
            None => {
                prop_assert!(result.is_err());
                prop_assert_eq!(meter.gas_consumed(), first);
            }
        }
    }

    #[proptest]
    fn exceeding_any_limit_is_rejected(
        #[strategy(0u64..1_000_000)] limit: u64,
        #[strategy(0u64..2_000_000)] amount: u64,
    ) {
        let mut meter = GasMeter::bounded(limit);
        let result = meter.consume(amount, GasKind::Commission);
        prop_assert_eq!(result.is_ok(), amount <= limit);
    }
}
