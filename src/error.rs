/// Errors reported by the hardware adapters.
///
/// `E` is the pin error type of the board; it is `Infallible` on the RP2040.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A GPIO read or write failed.
    Pin(E),
    /// A key was still held after the release wait ran out of polls.
    StuckKey,
}

