//! NUL-terminated strings in foreign linear memory.
//!
//! A guest hands the host a string by returning a pointer to a
//! NUL-terminated UTF-8 buffer it allocated. The host copies the bytes out
//! and then hands the allocation back through the guest's `dealloc_str`
//! export. The guest expects exactly one `dealloc_str` call per string, with
//! the pointer it returned.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForeignError {
    #[error(
        "tried to read undefined memory: string at 0x{ptr:08X} is not terminated \
         within {memory_size} bytes of linear memory"
    )]
    OutOfBoundsRead { ptr: u32, memory_size: usize },
    #[error("dealloc_str(0x{ptr:08X}) failed: {message}")]
    Dealloc { ptr: u32, message: String },
}

/// A foreign module as seen by the host: readable linear memory plus the
/// deallocation entry point for strings it allocated.
pub trait ForeignModule {
    /// The module's linear memory.
    fn memory(&self) -> &[u8];

    /// Release a string allocation the module handed to the host.
    fn dealloc_str(&mut self, ptr: u32) -> Result<(), ForeignError>;
}

/// Bytes of the NUL-terminated string at `ptr`, terminator excluded.
///
/// Fails with [`ForeignError::OutOfBoundsRead`] if `ptr` is past the end of
/// memory or no zero byte follows it.
pub fn scan_c_string(memory: &[u8], ptr: u32) -> Result<&[u8], ForeignError> {
    let out_of_bounds = || ForeignError::OutOfBoundsRead {
        ptr,
        memory_size: memory.len(),
    };

    let tail = memory.get(ptr as usize..).ok_or_else(out_of_bounds)?;
    let len = tail.iter().position(|&b| b == 0).ok_or_else(out_of_bounds)?;
    Ok(&tail[..len])
}

/// Copy the string at `ptr` out of the module and release it.
///
/// Invalid UTF-8 is replaced with U+FFFD. `dealloc_str` is called once with
/// the original `ptr` after the copy; it is not called if the read fails.
pub fn read_c_string<M>(module: &mut M, ptr: u32) -> Result<String, ForeignError>
where
    M: ForeignModule + ?Sized,
{
    let text = String::from_utf8_lossy(scan_c_string(module.memory(), ptr)?).into_owned();
    module.dealloc_str(ptr)?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingModule;

    #[test]
    fn test_read_hello_deallocs_original_pointer() {
        let mut module = RecordingModule::new(vec![72, 101, 108, 108, 111, 0, 33, 0]);

        let text = read_c_string(&mut module, 0).unwrap();

        assert_eq!(text, "Hello");
        assert_eq!(module.deallocs, vec![0]);
    }

    #[test]
    fn test_read_at_offset() {
        let mut memory = vec![0u8; 8];
        memory.extend_from_slice(b"Car.png\0");
        let mut module = RecordingModule::new(memory);

        assert_eq!(read_c_string(&mut module, 8).unwrap(), "Car.png");
        assert_eq!(module.deallocs, vec![8]);
    }

    #[test]
    fn test_read_empty_string() {
        let mut module = RecordingModule::new(vec![0, 1, 2]);
        assert_eq!(read_c_string(&mut module, 0).unwrap(), "");
        assert_eq!(module.deallocs, vec![0]);
    }

    #[test]
    fn test_unterminated_string_is_out_of_bounds() {
        let mut module = RecordingModule::new(b"no terminator".to_vec());

        let result = read_c_string(&mut module, 3);

        assert!(matches!(
            result,
            Err(ForeignError::OutOfBoundsRead { ptr: 3, memory_size: 13 })
        ));
        assert!(module.deallocs.is_empty());
    }

    #[test]
    fn test_pointer_past_end_is_out_of_bounds() {
        let mut module = RecordingModule::new(vec![65, 0]);

        assert!(matches!(
            read_c_string(&mut module, 2),
            Err(ForeignError::OutOfBoundsRead { .. })
        ));
        assert!(matches!(
            read_c_string(&mut module, u32::MAX),
            Err(ForeignError::OutOfBoundsRead { .. })
        ));
        assert!(module.deallocs.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut module = RecordingModule::new(vec![b'o', 0xFF, b'k', 0]);
        assert_eq!(read_c_string(&mut module, 0).unwrap(), "o\u{FFFD}k");
    }

    #[test]
    fn test_multibyte_utf8() {
        let mut memory = "资源加载".as_bytes().to_vec();
        memory.push(0);
        let mut module = RecordingModule::new(memory);
        assert_eq!(read_c_string(&mut module, 0).unwrap(), "资源加载");
    }

    #[test]
    fn test_scan_does_not_include_terminator() {
        assert_eq!(scan_c_string(b"ab\0cd\0", 3).unwrap(), b"cd");
    }
}
