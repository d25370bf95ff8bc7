use briny_array::{Array, Error, array, constants, empty, ones, random, zeros};

#[test]
fn test_create_empty_array() {
    let i = empty::<i32>(&[2, 3, 2]).unwrap();
    let f = empty::<f32>(&[2, 3, 2]).unwrap();
    assert_eq!(i.element_count(), 12);
    assert_eq!(f.buffer_bytes(), 48);
}

#[test]
fn test_create_array_from_literals() {
    let s = Array::scalar(1.0_f32);
    let v = array![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0];
    let m = array![[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
    let t = array![[[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]], [[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]];

    assert_eq!(s.info(), "dtype: float, dim: 0, shape: {}, strides: {}");
    assert_eq!(v.info(), "dtype: float, dim: 1, shape: {6}, strides: {1}");
    assert_eq!(m.info(), "dtype: float, dim: 2, shape: {3, 2}, strides: {2, 1}");
    assert_eq!(t.info(), "dtype: float, dim: 3, shape: {2, 3, 2}, strides: {6, 2, 1}");

    assert_eq!(s.to_string(), "1");
    assert_eq!(m.to_string(), "{{1, 2},\n {3, 4},\n {5, 6}}");
}

#[test]
fn test_create_array_with_shape() {
    assert_eq!(constants(&[2, 3, 2], 0.0_f32).unwrap(), zeros::<f32>(&[2, 3, 2]).unwrap());
    assert_eq!(constants(&[2, 3, 2], 1.0_f32).unwrap(), ones::<f32>(&[2, 3, 2]).unwrap());

    let rand = random(&[2, 3, 2]).unwrap();
    assert!(rand.all(|x| (0.0..1.0).contains(&x)));

    let v = vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
    let expected = array![[[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]], [[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]];
    assert_eq!(Array::from_shape_vec(&[2, 3, 2], v.clone()).unwrap(), expected);
    assert_eq!(Array::from_shape_iter(&[2, 3, 2], v).unwrap(), expected);
    assert_eq!(Array::from_shape_iter(&[2, 3, 2], (1..).map(|x| x as f32)).unwrap(), expected);
}

#[test]
fn test_clone_copies_and_share_aliases() {
    let a = ones::<f32>(&[4]).unwrap();

    let cloned = a.clone();
    cloned.zeros();
    assert_eq!(a, array![1.0, 1.0, 1.0, 1.0]);

    let assigned = a.share();
    assigned.zeros();
    assert_eq!(a, array![0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_arithmetic_operations() {
    let a = array![[1.0_f32, 2.0], [3.0, 4.0]];
    let b = array![[1.0_f32, 2.0], [3.0, 4.0]];

    assert_eq!(&a + &b, array![[2.0, 4.0], [6.0, 8.0]]);
    assert_eq!(&a - &b, array![[0.0, 0.0], [0.0, 0.0]]);
    assert_eq!(&a * &b, array![[1.0, 4.0], [9.0, 16.0]]);
    assert_eq!(&a / &b, array![[1.0, 1.0], [1.0, 1.0]]);
}

#[test]
fn test_random_arithmetic_matches_elementwise() {
    let a = random(&[16]).unwrap();
    let b = random(&[16]).unwrap();
    let sum = &a + &b;
    let product = &a * &b;
    for i in 0..16 {
        let (x, y) = (a.at(i).unwrap(), b.at(i).unwrap());
        assert_eq!(sum.at(i).unwrap(), x + y);
        assert_eq!(product.at(i).unwrap(), x * y);
    }
}

#[test]
fn test_broadcast_addition() {
    let a = array![[1, 2, 3], [4, 5, 6]];
    let b = array![1, 2, 3];
    assert_eq!(&a + &b, array![[2, 4, 6], [5, 7, 9]]);
    assert_eq!(&b + &a, &a + &b);
    assert_eq!(&a * &b, &b * &a);
}

#[test]
fn test_scalar_broadcast_both_sides() {
    let w = &random(&[2, 3]).unwrap() * 2.0 - 1.0;
    assert!(w.all(|x| (-1.0..1.0).contains(&x)));
    assert_eq!(2_i32 * &array![1, 2], array![2, 4]);
}

#[test]
fn test_mismatched_shapes_are_shape_errors() {
    let a = random(&[4]).unwrap();
    let b = random(&[8]).unwrap();
    assert_ne!(a, b);
    assert!(matches!(a.try_add(&b), Err(Error::Shape(_))));
    let result = std::panic::catch_unwind(|| &a + &b);
    assert!(result.is_err());
}

#[test]
fn test_dot_operation() {
    let x = array![1.0_f32, 2.0, 3.0];
    let w = array![[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
    assert_eq!(x.dot(&w).unwrap(), array![22.0, 28.0]);
}

#[test]
fn test_matrix_multiply() {
    let a = Array::from_shape_iter(&[3, 4], 1..).unwrap();
    let b = Array::from_shape_iter(&[4, 2], 1..).unwrap();
    let c = a.dot(&b).unwrap();
    assert_eq!(c.shape(), &[3, 2]);
    assert_eq!(c, array![[50, 60], [114, 140], [178, 220]]);
}

#[test]
fn test_dot_shape_law() {
    let v = array![1.0_f32, 2.0, 3.0];
    let inner = v.dot(&v).unwrap();
    assert_eq!(inner.dimension(), 0);
    assert_eq!(inner.scalar_value().unwrap(), 14.0);

    let a = zeros::<f32>(&[5, 7]).unwrap();
    let b = zeros::<f32>(&[7, 3]).unwrap();
    assert_eq!(a.dot(&b).unwrap().shape(), &[5, 3]);
    assert!(matches!(b.dot(&a), Err(Error::Shape(_))));
}

#[test]
fn test_mean_square_error() {
    let a = array![1.0_f32, 2.0, 3.0, 4.0];
    let b = array![0.0_f32, 2.0, 3.0, 6.0];
    assert_eq!(a.mean_square_error(&b).unwrap(), 1.25);
}

#[test]
fn test_softmax_rows_sum_to_one() {
    let a = &random(&[5, 4]).unwrap() * 10.0;
    let sums = a.softmax().unwrap().sum_axis(1).unwrap();
    assert!(sums.allclose(&ones::<f32>(&[5]).unwrap()));
}

#[test]
fn test_transpose_involution() {
    let v = array![1, 2, 3, 4];
    let t = v.transpose().unwrap();
    assert_eq!(t.shape(), &[1, 4]);
    let back = t.transpose().unwrap();
    assert_eq!(back.shape(), &[4]);
    assert_eq!(back, v);

    let m = random(&[3, 5]).unwrap();
    assert_eq!(m.transpose().unwrap().transpose().unwrap(), m);
    let c = random(&[2, 3, 4]).unwrap();
    assert_eq!(c.transpose().unwrap().transpose().unwrap(), c);
}

#[test]
fn test_rows_and_elements() {
    let a = zeros::<f32>(&[3, 2]).unwrap();
    for row in a.rows() {
        row.ones();
    }
    assert_eq!(a, ones::<f32>(&[3, 2]).unwrap());

    let total: f32 = a.elements().sum();
    assert_eq!(total, 6.0);
    assert_eq!((&a).into_iter().count(), 6);
}

#[test]
fn test_assignment_through_index() {
    let a = zeros::<f32>(&[8]).unwrap();
    for i in 0..a.length().unwrap() {
        a.set(i, 1.0).unwrap();
    }
    assert_eq!(ones::<f32>(&[8]).unwrap(), a);
    assert!(matches!(a.set(8, 1.0), Err(Error::Index(_))));
}

#[test]
fn test_invalid_literal() {
    let ragged = briny_array::literal!([[1, 2, 3], [4, 5]]);
    assert!(matches!(Array::from_literal(&ragged), Err(Error::InvalidLiteral(_))));
    let result = std::panic::catch_unwind(|| array![[1, 2, 3], [4, 5]]);
    assert!(result.is_err());
}
