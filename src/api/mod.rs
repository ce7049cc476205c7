pub mod employee;
pub mod leave;
pub mod payroll;
pub mod salary;

/// Row offset for 1-based pagination. Widened before multiplying so huge
/// `page` query values cannot overflow u32 arithmetic.
pub(crate) fn page_offset(page: u32, per_page: u32) -> u64 {
    (u64::from(page) - 1) * u64::from(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_is_zero_based() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
    }

    #[test]
    fn page_offset_survives_extreme_page_numbers() {
        assert_eq!(page_offset(u32::MAX, 100), (u64::from(u32::MAX) - 1) * 100);
    }
}
