bitflags::bitflags! {
    /// Per-platform strictness flags for [`super::ObjectChecker`] (§4.5).
    ///
    /// Neither flag is implied by the host OS the checker happens to run on — a server
    /// validating pushes from arbitrary clients wants both enabled regardless of its own
    /// platform, which is why they are opt-in bits rather than `cfg!(target_os)` switches.
    #[derive(Clone, Copy, Eq, PartialEq, Debug)]
    pub struct Options: u8 {
        /// Reject tree-entry names that are HFS+-ignorable-code-point disguises of `.git`.
        const MAC_SAFE = 0b0000_0001;
        /// Reject tree-entry names that are NTFS 8.3 aliases, reserved device names, or
        /// otherwise invalid on Windows.
        const WINDOWS_SAFE = 0b0000_0010;
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::empty()
    }
}
