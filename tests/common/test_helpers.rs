/// Common test helper functions
use std::fs;
use std::io::Read;
use std::path::Path;

/// Verify that a file contains only zeros
pub fn verify_all_zeros(path: &Path) -> std::io::Result<bool> {
    verify_pattern(path, &[0x00])
}

/// Verify that a file contains a specific pattern, repeated from offset 0
pub fn verify_pattern(path: &Path, pattern: &[u8]) -> std::io::Result<bool> {
    let mut file = fs::File::open(path)?;
    let mut buffer = vec![0u8; 4096];
    let mut offset = 0usize;

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        for &byte in &buffer[..bytes_read] {
            if byte != pattern[offset % pattern.len()] {
                return Ok(false);
            }
            offset += 1;
        }
    }

    Ok(true)
}

/// Calculate Shannon entropy of a file, in bits per byte
pub fn calculate_file_entropy(path: &Path) -> std::io::Result<f64> {
    let buffer = fs::read(path)?;
    if buffer.is_empty() {
        return Ok(0.0);
    }

    let mut counts = [0u64; 256];
    for &byte in &buffer {
        counts[byte as usize] += 1;
    }

    let length = buffer.len() as f64;
    let mut entropy = 0.0;

    for &count in &counts {
        if count > 0 {
            let probability = count as f64 / length;
            entropy -= probability * probability.log2();
        }
    }

    Ok(entropy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_verify_all_zeros() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&vec![0u8; 1024]).unwrap();
        temp.flush().unwrap();

        assert!(verify_all_zeros(temp.path()).unwrap());
    }

    #[test]
    fn test_verify_pattern_across_reads() {
        let mut temp = NamedTempFile::new().unwrap();
        let pattern = [0x92, 0x49, 0x24];
        let data: Vec<u8> = (0..10_000).map(|i| pattern[i % 3]).collect();
        temp.write_all(&data).unwrap();
        temp.flush().unwrap();

        assert!(verify_pattern(temp.path(), &pattern).unwrap());
        assert!(!verify_pattern(temp.path(), &[0x92, 0x49]).unwrap());
    }

    #[test]
    fn test_calculate_file_entropy() {
        let mut temp = NamedTempFile::new().unwrap();
        // All zeros should have near-zero entropy
        temp.write_all(&vec![0u8; 1000]).unwrap();
        temp.flush().unwrap();

        let entropy = calculate_file_entropy(temp.path()).unwrap();
        assert!(entropy < 0.1);
    }
}
