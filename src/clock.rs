//! Time budget for bounded waits.

/// Monotonic millisecond counter.
///
/// Only differences between readings are used, computed with wrapping
/// arithmetic, so the counter may start anywhere and wrap.
pub trait Clock {
    fn now_ms(&mut self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now_ms(&mut self) -> u32 {
        C::now_ms(self)
    }
}

/// Milliseconds elapsed since `since`.
#[inline]
pub(crate) fn elapsed_ms<C: Clock + ?Sized>(clock: &mut C, since: u32) -> u32 {
    clock.now_ms().wrapping_sub(since)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u32);

    impl Clock for Fixed {
        fn now_ms(&mut self) -> u32 {
            self.0
        }
    }

    #[test]
    fn elapsed_survives_wrap() {
        let mut clock = Fixed(5);
        assert_eq!(elapsed_ms(&mut clock, u32::MAX - 4), 10);
    }
}
