//! Boot image descriptor of the non-secure image.
use pse84_hal::port::CorePort;

/// First two words of a vector table: the initial main stack pointer and the reset handler.
///
/// The descriptor is trusted as is. Authenticity of the image is established by the secure boot
/// stages running before this code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootImageDescriptor {
    pub stack_pointer: u32,
    pub reset_handler: u32,
}

impl BootImageDescriptor {
    pub const STACK_POINTER_OFFSET: u32 = 0;
    pub const RESET_HANDLER_OFFSET: u32 = 4;

    pub fn read<P: CorePort + ?Sized>(port: &mut P, base: u32) -> Self {
        Self {
            stack_pointer: port.read_word(base + Self::STACK_POINTER_OFFSET),
            reset_handler: port.read_word(base + Self::RESET_HANDLER_OFFSET),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pse84_hal::port::recorder::{Call, CallRecorder};

    #[test]
    fn test_read() {
        let mut port = CallRecorder::new()
            .with_word(0x6030_0000, 0x2002_0000)
            .with_word(0x6030_0004, 0x6030_0401);
        let image = BootImageDescriptor::read(&mut port, 0x6030_0000);
        assert_eq!(image.stack_pointer, 0x2002_0000);
        assert_eq!(image.reset_handler, 0x6030_0401);
        assert_eq!(
            port.calls(),
            &[Call::ReadWord(0x6030_0000), Call::ReadWord(0x6030_0004)]
        );
    }
}
