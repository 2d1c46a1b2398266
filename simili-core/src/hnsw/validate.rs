use super::error::HnswError;

/// Rejects vectors the graph cannot store or compare meaningfully.
///
/// `expected` is the dimensionality already established for the index, if
/// any.
pub(crate) fn validate_vector(vector: &[f32], expected: Option<usize>) -> Result<(), HnswError> {
    if vector.is_empty() {
        return Err(HnswError::EmptyVector);
    }
    if let Some(dimension) = expected
        && dimension != vector.len()
    {
        return Err(HnswError::DimensionMismatch {
            expected: dimension,
            actual: vector.len(),
        });
    }
    if let Some(position) = vector.iter().position(|component| !component.is_finite()) {
        return Err(HnswError::NonFiniteComponent { position });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&[], None, HnswError::EmptyVector)]
    #[case(&[1.0, 2.0], Some(3), HnswError::DimensionMismatch { expected: 3, actual: 2 })]
    #[case(&[1.0, f32::NAN], None, HnswError::NonFiniteComponent { position: 1 })]
    #[case(&[f32::INFINITY], Some(1), HnswError::NonFiniteComponent { position: 0 })]
    fn rejects_invalid_vectors(
        #[case] vector: &[f32],
        #[case] expected: Option<usize>,
        #[case] error: HnswError,
    ) {
        assert_eq!(validate_vector(vector, expected), Err(error));
    }

    #[rstest]
    #[case(&[0.0, 0.0], Some(2))]
    #[case(&[1.0], None)]
    fn accepts_valid_vectors(#[case] vector: &[f32], #[case] expected: Option<usize>) {
        assert_eq!(validate_vector(vector, expected), Ok(()));
    }
}
