use crate::utils::error::{KioskError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(KioskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(KioskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(KioskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(KioskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(KioskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 驗證 `WIDTHxHEIGHT` 格式的輸出尺寸
pub fn validate_geometry(field_name: &str, geometry: &str) -> Result<()> {
    let invalid = |reason: &str| KioskError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: geometry.to_string(),
        reason: reason.to_string(),
    };

    let (width, height) = geometry
        .split_once('x')
        .ok_or_else(|| invalid("Expected WIDTHxHEIGHT"))?;

    for part in [width, height] {
        match part.parse::<u32>() {
            Ok(0) => return Err(invalid("Dimensions must be non-zero")),
            Ok(_) => {}
            Err(_) => return Err(invalid("Dimensions must be positive integers")),
        }
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed.iter().copied().collect();
    if !allowed_set.contains(value) {
        return Err(KioskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Unsupported value. Valid values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

/// 檔名不可包含路徑分隔符
pub fn validate_file_name(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    if value.contains('/') || value.contains('\\') || value == ".." || value == "." {
        return Err(KioskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Must be a plain file name".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("refresh_interval_minutes", 240, 1).is_ok());
        assert!(validate_positive_number("refresh_interval_minutes", 0, 1).is_err());
    }

    #[test]
    fn test_validate_geometry() {
        assert!(validate_geometry("render.geometry", "800x508").is_ok());
        assert!(validate_geometry("render.geometry", "800").is_err());
        assert!(validate_geometry("render.geometry", "0x508").is_err());
        assert!(validate_geometry("render.geometry", "axb").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("render.latitude", 0.0, -90.0, 90.0).is_ok());
        assert!(validate_range("render.longitude", -181.0, -180.0, 180.0).is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("output.file_name", "earth.png").is_ok());
        assert!(validate_file_name("output.file_name", "../earth.png").is_err());
        assert!(validate_file_name("output.file_name", "  ").is_err());
    }
}
