/// Abstraction over the Game Boy bus (memory and IO) as seen by the CPU.
///
/// The CPU only performs byte reads and writes; everything else (timers,
/// PPU, DMA) is advanced by the bus itself once an instruction completes.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Hook that marks the beginning of a single CPU instruction (or
    /// interrupt entry) from the bus's point of view.
    fn begin_instruction(&mut self) {}

    /// Hook that finalises a single CPU instruction (or interrupt entry).
    ///
    /// `cycles` is the total number of T-cycles the CPU consumed. System
    /// buses use this to advance their peripherals in lockstep.
    fn end_instruction(&mut self, _cycles: u32) {}

    /// Handle the CGB speed switch (KEY1 armed + STOP).
    ///
    /// Returns `true` if a speed switch occurred, in which case STOP does
    /// not enter the low-power state.
    fn speed_switch(&mut self) -> bool {
        false
    }
}
