//! Secretnum Array Integration Tests
//!
//! End-to-end coverage over a single-process session backed by the reference
//! engine. Numeric results go through fixed-point encoding, so value checks
//! use a 1e-6 tolerance; boolean and raw-share checks are exact.

use secretnum_array::{
    arange, argmax, argmax_and_max, argmin, array, average, column_stack, concatenate, dot,
    from_share, full, groupby_count, groupby_max, groupby_min, groupby_sum, hstack, identity,
    inner, linspace, logspace, max, mean, min, ones, prod, ptp, select, sort, sum, vstack,
    ArrayIndex, AxisIndex, DType, Operand, PlainArray, SecureArray, Session, Shape,
};

fn secret(session: &Session, plain: &PlainArray) -> SecureArray {
    array(session, Some(plain), 0, plain.dtype()).unwrap()
}

fn reveal(arr: &SecureArray) -> PlainArray {
    arr.reveal_to(0).unwrap().unwrap()
}

fn reveal_numeric(arr: &SecureArray) -> Vec<f64> {
    reveal(arr).as_numeric().unwrap().to_vec()
}

fn reveal_boolean(arr: &SecureArray) -> Vec<bool> {
    reveal(arr).as_boolean().unwrap().to_vec()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-6, "expected {e}, got {a}");
    }
}

// =============================================================================
// Section 1: Creation, Reveal and Share Round-Trips
// =============================================================================

mod creation_tests {
    use super::*;

    #[test]
    fn test_create_reveal_roundtrip() {
        let session = Session::in_process();
        let values = [0.5, -1.25, 3.75, 0.1];
        let x = secret(&session, &PlainArray::vector(&values));
        assert_eq!(x.shape(), Shape::Vector(4));
        assert_eq!(x.dtype(), DType::Numeric);
        assert_close(&reveal_numeric(&x), &values);
    }

    #[test]
    fn test_boolean_roundtrip_is_exact() {
        let session = Session::in_process();
        let values = [true, false, false, true];
        let x = secret(&session, &PlainArray::bool_vector(&values));
        assert_eq!(x.dtype(), DType::Boolean);
        assert_eq!(reveal_boolean(&x), values);
    }

    #[test]
    fn test_reveal_to_other_party_yields_nothing() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[1.0, 2.0]));
        assert!(x.reveal_to(1).unwrap().is_none());
    }

    #[test]
    fn test_share_export_import_roundtrip() {
        let session = Session::in_process();
        let plain = PlainArray::matrix(2, 2, vec![1.5, -2.5, 0.0, 7.0]).unwrap();
        let x = secret(&session, &plain);
        let share = x.to_share().unwrap();
        assert_eq!(share.shape(), Shape::Matrix(2, 2));
        let rebuilt = from_share(&session, &share, DType::Numeric).unwrap();
        assert_close(&reveal_numeric(&rebuilt), plain.as_numeric().unwrap());
    }

    #[test]
    fn test_numpy_style_constructors() {
        let session = Session::in_process();

        let x = ones(&session, Shape::Matrix(2, 2), 0).unwrap();
        assert_close(&reveal_numeric(&x), &[1.0, 1.0, 1.0, 1.0]);

        let x = full(&session, Shape::Vector(3), 2.5, 0).unwrap();
        assert_close(&reveal_numeric(&x), &[2.5, 2.5, 2.5]);

        let x = identity(&session, 3, 0).unwrap();
        assert_eq!(x.shape(), Shape::Matrix(3, 3));
        assert_close(
            &reveal_numeric(&x),
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        );

        let x = arange(&session, 0.0, 5.0, 1.0, 0).unwrap();
        assert_close(&reveal_numeric(&x), &[0.0, 1.0, 2.0, 3.0, 4.0]);

        let x = linspace(&session, 0.0, 1.0, 5, 0).unwrap();
        assert_close(&reveal_numeric(&x), &[0.0, 0.25, 0.5, 0.75, 1.0]);

        let x = logspace(&session, 0.0, 2.0, 3, 0).unwrap();
        assert_close(&reveal_numeric(&x), &[1.0, 10.0, 100.0]);
    }

    #[test]
    fn test_provider_must_supply_data() {
        let session = Session::in_process();
        assert!(array(&session, None, 0, DType::Numeric).is_err());
    }

    #[test]
    fn test_copy_is_independent() {
        let session = Session::in_process();
        let mut x = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        let y = x.copy().unwrap();
        x.set(ArrayIndex::at(0), Operand::Scalar(9.0)).unwrap();
        assert_close(&reveal_numeric(&x), &[9.0, 2.0, 3.0]);
        assert_close(&reveal_numeric(&y), &[1.0, 2.0, 3.0]);
    }
}

// =============================================================================
// Section 2: Arithmetic and Broadcasting
// =============================================================================

mod arithmetic_tests {
    use super::*;

    #[test]
    fn test_add_public_scalar() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        let y = x.add(Operand::Scalar(1.0)).unwrap();
        assert_close(&reveal_numeric(&y), &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_elementwise_secret_operands() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        let b = secret(&session, &PlainArray::vector(&[4.0, 5.0, 6.0]));
        assert_close(&reveal_numeric(&a.add(Operand::Secret(&b)).unwrap()), &[5.0, 7.0, 9.0]);
        assert_close(&reveal_numeric(&a.sub(Operand::Secret(&b)).unwrap()), &[-3.0, -3.0, -3.0]);
        assert_close(&reveal_numeric(&a.mul(Operand::Secret(&b)).unwrap()), &[4.0, 10.0, 18.0]);
        assert_close(&reveal_numeric(&b.div(Operand::Secret(&a)).unwrap()), &[4.0, 2.5, 2.0]);
        assert_close(&reveal_numeric(&a.neg().unwrap()), &[-1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_plain_rhs() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        let w = PlainArray::vector(&[2.0, 0.5, -1.0]);
        assert_close(&reveal_numeric(&a.mul(Operand::Plain(&w)).unwrap()), &[2.0, 1.0, -3.0]);
    }

    #[test]
    fn test_rank0_broadcast() {
        let session = Session::in_process();
        let v = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        let s = secret(&session, &PlainArray::scalar(10.0));

        // Scalar rhs replicates to the vector's shape.
        let y = v.add(Operand::Secret(&s)).unwrap();
        assert_eq!(y.shape(), Shape::Vector(3));
        assert_close(&reveal_numeric(&y), &[11.0, 12.0, 13.0]);

        // Scalar lhs replicates the other way too.
        let y = s.add(Operand::Secret(&v)).unwrap();
        assert_eq!(y.shape(), Shape::Vector(3));
        assert_close(&reveal_numeric(&y), &[11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::zeros(Shape::Matrix(2, 5)));
        let b = secret(&session, &PlainArray::zeros(Shape::Matrix(3, 5)));
        assert!(a.add(Operand::Secret(&b)).is_err());
    }

    #[test]
    fn test_arithmetic_rejects_boolean() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::bool_vector(&[true, false]));
        assert!(x.add(Operand::Scalar(1.0)).is_err());
    }

    #[test]
    fn test_scalar_rhs_on_matrix() {
        let session = Session::in_process();
        let x = secret(
            &session,
            &PlainArray::matrix(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
        );
        let y = x.sub(Operand::Scalar(0.5)).unwrap();
        assert_eq!(y.shape(), Shape::Matrix(2, 2));
        assert_close(&reveal_numeric(&y), &[0.5, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_fractional_values_within_tolerance() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::vector(&[0.1, 0.2, 0.3]));
        let y = a.mul(Operand::Scalar(3.0)).unwrap();
        assert_close(&reveal_numeric(&y), &[0.3, 0.6, 0.9]);
    }
}

// =============================================================================
// Section 3: Comparisons and Logical Operations
// =============================================================================

mod comparison_tests {
    use super::*;

    #[test]
    fn test_comparisons_against_scalar() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        assert_eq!(reveal_boolean(&x.lt(Operand::Scalar(2.0)).unwrap()), [true, false, false]);
        assert_eq!(reveal_boolean(&x.gt(Operand::Scalar(2.0)).unwrap()), [false, false, true]);
        assert_eq!(reveal_boolean(&x.eq(Operand::Scalar(2.0)).unwrap()), [false, true, false]);
        assert_eq!(reveal_boolean(&x.ge(Operand::Scalar(2.0)).unwrap()), [false, true, true]);
        assert_eq!(reveal_boolean(&x.le(Operand::Scalar(2.0)).unwrap()), [true, true, false]);
        assert_eq!(reveal_boolean(&x.ne(Operand::Scalar(2.0)).unwrap()), [true, false, true]);
    }

    #[test]
    fn test_equality_is_exact_on_encodings() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[0.1, 0.2, 0.1]));
        assert_eq!(reveal_boolean(&x.eq(Operand::Scalar(0.1)).unwrap()), [true, false, true]);
    }

    #[test]
    fn test_comparisons_between_secrets() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::vector(&[1.0, 5.0, 3.0]));
        let b = secret(&session, &PlainArray::vector(&[2.0, 5.0, 1.0]));
        assert_eq!(reveal_boolean(&a.lt(Operand::Secret(&b)).unwrap()), [true, false, false]);
        assert_eq!(reveal_boolean(&a.ge(Operand::Secret(&b)).unwrap()), [false, true, true]);
        assert_eq!(reveal_boolean(&a.eq(Operand::Secret(&b)).unwrap()), [false, true, false]);
    }

    #[test]
    fn test_logical_operations() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::bool_vector(&[true, true, false, false]));
        let b = secret(&session, &PlainArray::bool_vector(&[true, false, true, false]));
        assert_eq!(
            reveal_boolean(&a.and(Operand::Secret(&b)).unwrap()),
            [true, false, false, false]
        );
        assert_eq!(
            reveal_boolean(&a.or(Operand::Secret(&b)).unwrap()),
            [true, true, true, false]
        );
        assert_eq!(
            reveal_boolean(&a.xor(Operand::Secret(&b)).unwrap()),
            [false, true, true, false]
        );
        assert_eq!(reveal_boolean(&a.not().unwrap()), [false, false, true, true]);
    }

    #[test]
    fn test_logical_rejects_numeric() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[1.0]));
        assert!(x.not().is_err());
    }
}

// =============================================================================
// Section 4: Indexing and Assignment
// =============================================================================

mod indexing_tests {
    use super::*;

    fn nine_by_two(session: &Session) -> SecureArray {
        // 0..18 laid out as rows (2i, 2i + 1).
        arange(session, 0.0, 18.0, 1.0, 0)
            .unwrap()
            .reshape(&[9, 2])
            .unwrap()
    }

    #[test]
    fn test_pair_int_index() {
        let session = Session::in_process();
        let x = nine_by_two(&session);
        let y = x.get(ArrayIndex::pair(AxisIndex::at(2), AxisIndex::at(1))).unwrap();
        assert_eq!(y.shape(), Shape::Scalar);
        assert_close(&reveal_numeric(&y), &[5.0]);
    }

    #[test]
    fn test_column_slice_flattens_to_row_storage() {
        let session = Session::in_process();
        let x = nine_by_two(&session);
        let y = x
            .get(ArrayIndex::pair(AxisIndex::slice(1, None), AxisIndex::at(1)))
            .unwrap();
        assert_eq!(y.shape(), Shape::Vector(8));
        assert_close(
            &reveal_numeric(&y),
            &[3.0, 5.0, 7.0, 9.0, 11.0, 13.0, 15.0, 17.0],
        );
    }

    #[test]
    fn test_negative_row_slice() {
        let session = Session::in_process();
        let x = nine_by_two(&session);
        let y = x.get(ArrayIndex::slice(-5, -1)).unwrap();
        assert_eq!(y.shape(), Shape::Matrix(4, 2));
        assert_close(
            &reveal_numeric(&y),
            &[8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0],
        );
    }

    #[test]
    fn test_row_index_on_matrix() {
        let session = Session::in_process();
        let x = nine_by_two(&session);
        let y = x.get(ArrayIndex::at(0)).unwrap();
        assert_eq!(y.shape(), Shape::Vector(2));
        assert_close(&reveal_numeric(&y), &[0.0, 1.0]);
    }

    #[test]
    fn test_vector_indexing() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[10.0, 20.0, 30.0, 40.0]));
        let y = x.get(ArrayIndex::at(-1)).unwrap();
        assert_eq!(y.shape(), Shape::Scalar);
        assert_close(&reveal_numeric(&y), &[40.0]);
        let y = x.get(ArrayIndex::slice(1, 3)).unwrap();
        assert_close(&reveal_numeric(&y), &[20.0, 30.0]);
    }

    #[test]
    fn test_invalid_indices_rejected() {
        let session = Session::in_process();
        let v = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        assert!(v.get(ArrayIndex::at(3)).is_err());
        assert!(v.get(ArrayIndex::slice(2, 2)).is_err());
        assert!(v
            .get(ArrayIndex::pair(AxisIndex::at(0), AxisIndex::at(0)))
            .is_err());
        let s = secret(&session, &PlainArray::scalar(1.0));
        assert!(s.get(ArrayIndex::at(0)).is_err());
    }

    #[test]
    fn test_set_scalar_into_slice() {
        let session = Session::in_process();
        let mut x = secret(&session, &PlainArray::vector(&[0.0, 0.0, 0.0, 0.0]));
        x.set(ArrayIndex::slice(1, 3), Operand::Scalar(5.0)).unwrap();
        assert_close(&reveal_numeric(&x), &[0.0, 5.0, 5.0, 0.0]);
    }

    #[test]
    fn test_set_plain_row() {
        let session = Session::in_process();
        let mut x = secret(&session, &PlainArray::zeros(Shape::Matrix(2, 2)));
        let row = PlainArray::vector(&[9.0, 8.0]);
        x.set(ArrayIndex::at(0), Operand::Plain(&row)).unwrap();
        assert_close(&reveal_numeric(&x), &[9.0, 8.0, 0.0, 0.0]);
    }

    #[test]
    fn test_set_secret_block() {
        let session = Session::in_process();
        let mut x = secret(&session, &PlainArray::zeros(Shape::Matrix(2, 2)));
        let column = secret(&session, &PlainArray::vector(&[1.0, 2.0]));
        x.set(
            ArrayIndex::pair(AxisIndex::all(), AxisIndex::at(1)),
            Operand::Secret(&column),
        )
        .unwrap();
        assert_close(&reveal_numeric(&x), &[0.0, 1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_set_size_mismatch_rejected() {
        let session = Session::in_process();
        let mut x = secret(&session, &PlainArray::zeros(Shape::Matrix(2, 2)));
        let wrong = PlainArray::vector(&[1.0, 2.0, 3.0]);
        assert!(x.set(ArrayIndex::at(0), Operand::Plain(&wrong)).is_err());
    }
}

// =============================================================================
// Section 5: Shape Manipulation
// =============================================================================

mod shape_tests {
    use super::*;

    #[test]
    fn test_reshape_involution() {
        let session = Session::in_process();
        let values: Vec<f64> = (0..18).map(f64::from).collect();
        let x = secret(&session, &PlainArray::vector(&values));
        let back = x.reshape(&[9, 2]).unwrap().flatten().unwrap();
        assert_eq!(back.shape(), Shape::Vector(18));
        assert_close(&reveal_numeric(&back), &values);
    }

    #[test]
    fn test_reshape_wildcard() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        let y = x.reshape(&[-1, 2]).unwrap();
        assert_eq!(y.shape(), Shape::Matrix(3, 2));
        assert!(x.reshape(&[-1, 4]).is_err());
        assert!(x.reshape(&[2, 2]).is_err());
    }

    #[test]
    fn test_transpose() {
        let session = Session::in_process();
        let x = arange(&session, 0.0, 10.0, 1.0, 0)
            .unwrap()
            .reshape(&[2, 5])
            .unwrap();
        let t = x.transpose().unwrap();
        assert_eq!(t.shape(), Shape::Matrix(5, 2));
        assert_close(
            &reveal_numeric(&t),
            &[0.0, 5.0, 1.0, 6.0, 2.0, 7.0, 3.0, 8.0, 4.0, 9.0],
        );
    }

    #[test]
    fn test_transpose_of_vector_is_copy() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[1.0, 2.0]));
        let t = x.transpose().unwrap();
        assert_eq!(t.shape(), Shape::Vector(2));
        assert_close(&reveal_numeric(&t), &[1.0, 2.0]);
    }

    #[test]
    fn test_resize_repeats_cyclically() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[1.0, 2.0]));
        let y = x.resize(&[2, 3]).unwrap();
        assert_eq!(y.shape(), Shape::Matrix(2, 3));
        assert_close(&reveal_numeric(&y), &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
        assert!(x.resize(&[-1, 2]).is_err());
    }
}

// =============================================================================
// Section 6: Matrix Products
// =============================================================================

mod matmul_tests {
    use super::*;

    #[test]
    fn test_matrix_by_matrix() {
        let session = Session::in_process();
        let a = secret(
            &session,
            &PlainArray::matrix(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
        );
        let b = secret(
            &session,
            &PlainArray::matrix(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
        );
        let c = a.matmul(Operand::Secret(&b)).unwrap();
        assert_eq!(c.shape(), Shape::Matrix(2, 2));
        assert_close(&reveal_numeric(&c), &[22.0, 28.0, 49.0, 64.0]);
    }

    #[test]
    fn test_matrix_by_vector() {
        let session = Session::in_process();
        let a = secret(
            &session,
            &PlainArray::matrix(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
        );
        let v = secret(&session, &PlainArray::vector(&[1.0, 1.0, 1.0]));
        let y = a.matmul(Operand::Secret(&v)).unwrap();
        assert_eq!(y.shape(), Shape::Vector(2));
        assert_close(&reveal_numeric(&y), &[6.0, 15.0]);
    }

    #[test]
    fn test_vector_by_matrix() {
        let session = Session::in_process();
        let v = secret(&session, &PlainArray::vector(&[1.0, 1.0]));
        let a = secret(
            &session,
            &PlainArray::matrix(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
        );
        let y = v.matmul(Operand::Secret(&a)).unwrap();
        assert_eq!(y.shape(), Shape::Vector(3));
        assert_close(&reveal_numeric(&y), &[5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_plain_rhs_matmul() {
        let session = Session::in_process();
        let a = secret(
            &session,
            &PlainArray::matrix(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
        );
        let y = a.matmul(Operand::Plain(&PlainArray::identity(2))).unwrap();
        assert_close(&reveal_numeric(&y), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_inner_and_dot() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        let b = secret(&session, &PlainArray::vector(&[4.0, 5.0, 6.0]));
        let y = inner(&a, &b).unwrap();
        assert_eq!(y.shape(), Shape::Scalar);
        assert_close(&reveal_numeric(&y), &[32.0]);
        let y = dot(&a, Operand::Secret(&b)).unwrap();
        assert_eq!(y.shape(), Shape::Scalar);
        assert_close(&reveal_numeric(&y), &[32.0]);
    }

    #[test]
    fn test_matmul_dimension_mismatch() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::zeros(Shape::Matrix(2, 3)));
        let b = secret(&session, &PlainArray::zeros(Shape::Matrix(2, 3)));
        assert!(a.matmul(Operand::Secret(&b)).is_err());
        assert!(a.matmul(Operand::Scalar(2.0)).is_err());
    }
}

// =============================================================================
// Section 7: Stacking and Concatenation
// =============================================================================

mod stacking_tests {
    use super::*;

    #[test]
    fn test_vstack_vectors() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        let b = secret(&session, &PlainArray::vector(&[4.0, 5.0, 6.0]));
        let y = vstack(&[&a, &b]).unwrap();
        assert_eq!(y.shape(), Shape::Matrix(2, 3));
        assert_close(&reveal_numeric(&y), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_hstack_vectors_concatenate() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::vector(&[1.0, 2.0]));
        let b = secret(&session, &PlainArray::vector(&[3.0]));
        let c = secret(&session, &PlainArray::vector(&[4.0, 5.0]));
        let y = hstack(&[&a, &b, &c]).unwrap();
        assert_eq!(y.shape(), Shape::Vector(5));
        assert_close(&reveal_numeric(&y), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_hstack_matrices() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::matrix(2, 1, vec![1.0, 3.0]).unwrap());
        let b = secret(&session, &PlainArray::matrix(2, 2, vec![2.0, 9.0, 4.0, 9.0]).unwrap());
        let y = hstack(&[&a, &b]).unwrap();
        assert_eq!(y.shape(), Shape::Matrix(2, 3));
        assert_close(&reveal_numeric(&y), &[1.0, 2.0, 9.0, 3.0, 4.0, 9.0]);
    }

    #[test]
    fn test_column_stack_of_vectors() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        let b = secret(&session, &PlainArray::vector(&[4.0, 5.0, 6.0]));
        let y = column_stack(&[&a, &b]).unwrap();
        assert_eq!(y.shape(), Shape::Matrix(3, 2));
        assert_close(&reveal_numeric(&y), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_concatenate_axes() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::matrix(1, 2, vec![1.0, 2.0]).unwrap());
        let b = secret(&session, &PlainArray::matrix(1, 2, vec![3.0, 4.0]).unwrap());

        let y = concatenate(&[&a, &b], Some(0)).unwrap();
        assert_eq!(y.shape(), Shape::Matrix(2, 2));

        let y = concatenate(&[&a, &b], Some(1)).unwrap();
        assert_eq!(y.shape(), Shape::Matrix(1, 4));
        assert_close(&reveal_numeric(&y), &[1.0, 2.0, 3.0, 4.0]);

        let y = concatenate(&[&a, &b], None).unwrap();
        assert_eq!(y.shape(), Shape::Vector(4));

        assert!(concatenate(&[&a, &b], Some(2)).is_err());
    }

    #[test]
    fn test_stacking_validation_precedes_dispatch() {
        let session = Session::in_process();
        let a = secret(&session, &PlainArray::vector(&[1.0, 2.0]));
        let b = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        // Fewer than two inputs and inconsistent widths both fail up front.
        assert!(vstack(&[&a]).is_err());
        assert!(vstack(&[&a, &b]).is_err());
        let bools = secret(&session, &PlainArray::bool_vector(&[true, false]));
        assert!(hstack(&[&a, &bools]).is_err());
    }
}

// =============================================================================
// Section 8: Reductions and Statistics
// =============================================================================

mod reduction_tests {
    use super::*;

    fn two_by_three(session: &Session) -> SecureArray {
        secret(
            session,
            &PlainArray::matrix(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
        )
    }

    #[test]
    fn test_sum_over_axes() {
        let session = Session::in_process();
        let x = two_by_three(&session);
        assert_close(&reveal_numeric(&sum(&x, Some(0)).unwrap()), &[5.0, 7.0, 9.0]);
        assert_close(&reveal_numeric(&sum(&x, Some(1)).unwrap()), &[6.0, 15.0]);
        let total = sum(&x, None).unwrap();
        assert_eq!(total.shape(), Shape::Scalar);
        assert_close(&reveal_numeric(&total), &[21.0]);
        assert!(sum(&x, Some(2)).is_err());
    }

    #[test]
    fn test_prod() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0, 4.0]));
        assert_close(&reveal_numeric(&prod(&x, None).unwrap()), &[24.0]);
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let session = Session::in_process();
        let x = arange(&session, 0.0, 0.0, 1.0, 0).unwrap();
        assert_eq!(x.shape(), Shape::Vector(0));
        let total = sum(&x, None).unwrap();
        assert_eq!(total.shape(), Shape::Scalar);
        assert_close(&reveal_numeric(&total), &[0.0]);
    }

    #[test]
    fn test_max_min_over_axes() {
        let session = Session::in_process();
        let x = secret(
            &session,
            &PlainArray::matrix(2, 3, vec![3.0, 1.0, 2.0, 0.0, 5.0, 4.0]).unwrap(),
        );
        assert_close(&reveal_numeric(&max(&x, Some(0)).unwrap()), &[3.0, 5.0, 4.0]);
        assert_close(&reveal_numeric(&max(&x, Some(1)).unwrap()), &[3.0, 5.0]);
        assert_close(&reveal_numeric(&max(&x, None).unwrap()), &[5.0]);
        assert_close(&reveal_numeric(&min(&x, Some(0)).unwrap()), &[0.0, 1.0, 2.0]);
        assert_close(&reveal_numeric(&min(&x, None).unwrap()), &[0.0]);
    }

    #[test]
    fn test_mean() {
        let session = Session::in_process();
        let x = two_by_three(&session);
        assert_close(&reveal_numeric(&mean(&x, Some(0)).unwrap()), &[2.5, 3.5, 4.5]);
        assert_close(&reveal_numeric(&mean(&x, Some(1)).unwrap()), &[2.0, 5.0]);
        assert_close(&reveal_numeric(&mean(&x, None).unwrap()), &[3.5]);
    }

    #[test]
    fn test_average_with_plain_weights() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        let w = PlainArray::vector(&[3.0, 1.0, 0.0]);
        let y = average(&x, None, Some(Operand::Plain(&w))).unwrap();
        assert_close(&reveal_numeric(&y), &[1.25]);
        assert!(average(&x, None, Some(Operand::Scalar(2.0))).is_err());
    }

    #[test]
    fn test_average_row_weights_broadcast() {
        let session = Session::in_process();
        let x = two_by_three(&session);
        let w = PlainArray::vector(&[1.0, 2.0, 3.0]);
        let y = average(&x, Some(1), Some(Operand::Plain(&w))).unwrap();
        assert_eq!(y.shape(), Shape::Vector(2));
        assert_close(&reveal_numeric(&y), &[14.0 / 6.0, 32.0 / 6.0]);
    }

    #[test]
    fn test_average_with_secret_weights() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        let w = secret(&session, &PlainArray::vector(&[3.0, 1.0, 0.0]));
        let y = average(&x, None, Some(Operand::Secret(&w))).unwrap();
        assert_close(&reveal_numeric(&y), &[1.25]);
    }

    #[test]
    fn test_ptp() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[1.0, 5.0, 3.0]));
        let y = ptp(&x, None).unwrap();
        assert_eq!(y.shape(), Shape::Scalar);
        assert_close(&reveal_numeric(&y), &[4.0]);
    }
}

// =============================================================================
// Section 9: Selection, Argmax and Sorting
// =============================================================================

mod sort_search_tests {
    use super::*;

    #[test]
    fn test_select() {
        let session = Session::in_process();
        let cond = secret(&session, &PlainArray::bool_vector(&[true, false, true]));
        let x = secret(&session, &PlainArray::vector(&[1.0, 2.0, 3.0]));
        let y = secret(&session, &PlainArray::vector(&[4.0, 5.0, 6.0]));
        let z = select(&cond, &x, &y).unwrap();
        assert_close(&reveal_numeric(&z), &[1.0, 5.0, 3.0]);
        assert!(select(&x, &x, &y).is_err());
    }

    #[test]
    fn test_argmax_over_axes() {
        let session = Session::in_process();
        let x = secret(
            &session,
            &PlainArray::matrix(2, 3, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(),
        );
        let (idx, value) = argmax_and_max(&x, Some(0)).unwrap();
        assert_eq!(idx.shape(), Shape::Vector(3));
        assert_close(&reveal_numeric(&idx), &[1.0, 1.0, 1.0]);
        assert_close(&reveal_numeric(&value), &[3.0, 4.0, 5.0]);

        let (idx, value) = argmax_and_max(&x, Some(1)).unwrap();
        assert_close(&reveal_numeric(&idx), &[2.0, 2.0]);
        assert_close(&reveal_numeric(&value), &[2.0, 5.0]);

        let (idx, value) = argmax_and_max(&x, None).unwrap();
        assert_eq!(idx.shape(), Shape::Scalar);
        assert_close(&reveal_numeric(&idx), &[5.0]);
        assert_close(&reveal_numeric(&value), &[5.0]);

        assert!(argmax_and_max(&x, Some(2)).is_err());
    }

    #[test]
    fn test_argmax_argmin_of_vector() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[2.0, 7.0, 1.0]));
        assert_close(&reveal_numeric(&argmax(&x, None).unwrap()), &[1.0]);
        assert_close(&reveal_numeric(&argmin(&x, None).unwrap()), &[2.0]);
    }

    #[test]
    fn test_sort_flat() {
        let session = Session::in_process();
        let x = secret(&session, &PlainArray::vector(&[3.0, 1.0, 2.0]));
        let y = sort(&x, None).unwrap();
        assert_close(&reveal_numeric(&y), &[1.0, 2.0, 3.0]);
        // The input is untouched.
        assert_close(&reveal_numeric(&x), &[3.0, 1.0, 2.0]);

        let m = secret(&session, &PlainArray::matrix(2, 2, vec![4.0, 1.0, 3.0, 2.0]).unwrap());
        let y = sort(&m, None).unwrap();
        assert_eq!(y.shape(), Shape::Vector(4));
        assert_close(&reveal_numeric(&y), &[1.0, 2.0, 3.0, 4.0]);
        assert!(sort(&m, Some(0)).is_err());
    }

    #[test]
    fn test_sort_by_column() {
        let session = Session::in_process();
        let x = secret(
            &session,
            &PlainArray::matrix(3, 2, vec![3.0, 1.0, 1.0, 2.0, 2.0, 3.0]).unwrap(),
        );
        let y = x.sort_by_column(0).unwrap();
        assert_close(&reveal_numeric(&y), &[1.0, 2.0, 2.0, 3.0, 3.0, 1.0]);
        assert!(x.sort_by_column(2).is_err());
        assert!(x.sort_by_column(-1).is_err());
    }
}

// =============================================================================
// Section 10: Grouped Aggregates
// =============================================================================

mod groupby_tests {
    use super::*;

    fn grouped(session: &Session) -> (SecureArray, SecureArray) {
        // Rows 0..1 belong to group 0, rows 2..3 to group 1.
        let x = secret(
            session,
            &PlainArray::matrix(4, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
        );
        let encoding = secret(
            session,
            &PlainArray::matrix(4, 2, vec![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0]).unwrap(),
        );
        (x, encoding)
    }

    #[test]
    fn test_groupby_aggregates() {
        let session = Session::in_process();
        let (x, encoding) = grouped(&session);

        let y = groupby_sum(&x, &encoding).unwrap();
        assert_eq!(y.shape(), Shape::Matrix(1, 2));
        assert_close(&reveal_numeric(&y), &[3.0, 7.0]);

        assert_close(&reveal_numeric(&groupby_count(&x, &encoding).unwrap()), &[2.0, 2.0]);
        assert_close(&reveal_numeric(&groupby_max(&x, &encoding).unwrap()), &[2.0, 4.0]);
        assert_close(&reveal_numeric(&groupby_min(&x, &encoding).unwrap()), &[1.0, 3.0]);
    }

    #[test]
    fn test_groupby_mixed_membership() {
        let session = Session::in_process();
        let x = secret(
            &session,
            &PlainArray::matrix(
                6,
                2,
                vec![
                    -15.812, -14.7387, 7.812, -9.7387, -2.812, 6.7387, 1.812, 1.7387, 5.812,
                    0.7387, -7.812, -9.7387,
                ],
            )
            .unwrap(),
        );
        // Group 0 holds rows {0, 1, 3, 5}; group 1 adds row 4.
        let encoding = secret(
            &session,
            &PlainArray::matrix(
                6,
                2,
                vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0],
            )
            .unwrap(),
        );

        let y = groupby_sum(&x, &encoding).unwrap();
        assert_eq!(y.shape(), Shape::Matrix(2, 2));
        assert_close(&reveal_numeric(&y), &[-14.0, -8.188, -32.4774, -31.7387]);

        assert_close(
            &reveal_numeric(&groupby_count(&x, &encoding).unwrap()),
            &[4.0, 5.0, 4.0, 5.0],
        );
        assert_close(
            &reveal_numeric(&groupby_max(&x, &encoding).unwrap()),
            &[7.812, 7.812, 1.7387, 1.7387],
        );
        assert_close(
            &reveal_numeric(&groupby_min(&x, &encoding).unwrap()),
            &[-15.812, -15.812, -14.7387, -14.7387],
        );
    }

    #[test]
    fn test_groupby_shape_validation() {
        let session = Session::in_process();
        let (x, _) = grouped(&session);
        let short = secret(&session, &PlainArray::matrix(2, 2, vec![1.0; 4]).unwrap());
        assert!(groupby_sum(&x, &short).is_err());
        let v = secret(&session, &PlainArray::vector(&[1.0, 2.0]));
        assert!(groupby_sum(&v, &short).is_err());
    }
}
