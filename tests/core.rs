use std::thread;

use briny_array::{Array, Device, array, ones, random, with_device, zeros};

struct LogicGate {
    w0: f32,
    w1: f32,
    b: f32,
}

impl LogicGate {
    fn train(dataset: &Array<i32>) -> Self {
        let mut gate = Self { w0: 0.1, w1: 0.1, b: 0.1 };
        let learning_rate = 1.0;
        for _ in 0..10 {
            for [x0, x1, t] in dataset.row_tuples::<3>().unwrap() {
                let diff = (t - gate.predict(x0, x1)) as f32 * learning_rate;
                gate.w0 += diff * x0 as f32;
                gate.w1 += diff * x1 as f32;
                gate.b += diff;
            }
        }
        gate
    }

    fn predict(&self, x0: i32, x1: i32) -> i32 {
        let y = x0 as f32 * self.w0 + x1 as f32 * self.w1 + self.b;
        i32::from(y > 0.0)
    }
}

#[test]
fn test_perceptron_logic_gates() {
    let and = LogicGate::train(&array![[0, 0, 0], [0, 1, 0], [1, 0, 0], [1, 1, 1]]);
    let or = LogicGate::train(&array![[0, 0, 0], [0, 1, 1], [1, 0, 1], [1, 1, 1]]);
    let nand = LogicGate::train(&array![[0, 0, 1], [0, 1, 1], [1, 0, 1], [1, 1, 0]]);
    let xor = |x0, x1| and.predict(nand.predict(x0, x1), or.predict(x0, x1));

    let inputs = [(0, 0), (0, 1), (1, 0), (1, 1)];
    let table = |f: &dyn Fn(i32, i32) -> i32| inputs.map(|(a, b)| f(a, b));

    assert_eq!(table(&|a, b| and.predict(a, b)), [0, 0, 0, 1]);
    assert_eq!(table(&|a, b| or.predict(a, b)), [0, 1, 1, 1]);
    assert_eq!(table(&|a, b| nand.predict(a, b)), [1, 1, 1, 0]);
    assert_eq!(table(&xor), [0, 1, 1, 0]);
}

fn sigmoid_backward(dout: &Array<f32>, x: &Array<f32>) -> Array<f32> {
    let y = x.sigmoid().unwrap();
    dout * &(&y * &(1.0_f32 - &y))
}

fn linear_backward(
    dout: &Array<f32>,
    x: &Array<f32>,
    w: &Array<f32>,
) -> (Array<f32>, Array<f32>, Array<f32>) {
    let dx = dout.dot(&w.transpose().unwrap()).unwrap();
    let dw = x.transpose().unwrap().dot(dout).unwrap();
    let db = dout.sum_axis(0).unwrap();
    (dx, dw, db)
}

#[test]
fn test_two_layer_network_learns_xor() {
    with_device(Device::Cpu, || {
        let x = array![[0.0_f32, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = array![[0.0_f32], [1.0], [1.0], [0.0]];

        let mut w1 = &random(&[2, 3]).unwrap() * 2.0 - 1.0;
        let mut b1 = random(&[3]).unwrap();
        let mut w2 = &random(&[3, 1]).unwrap() * 2.0 - 1.0;
        let mut b2 = random(&[1]).unwrap();
        let learning_rate = 0.5;

        let mut losses = Vec::new();
        for _ in 0..500 {
            let net1 = x.linear(&w1, &b1).unwrap();
            let out1 = net1.sigmoid().unwrap();
            let net2 = out1.linear(&w2, &b2).unwrap();
            let out2 = net2.sigmoid().unwrap();
            losses.push(out2.mean_square_error(&y).unwrap());

            let dout = 2.0_f32 * &(&out2 - &y);
            let dout = sigmoid_backward(&dout, &net2);
            let (dout, dw2, db2) = linear_backward(&dout, &out1, &w2);
            let dout = sigmoid_backward(&dout, &net1);
            let (_, dw1, db1) = linear_backward(&dout, &x, &w1);

            w1 = &w1 - &(&dw1 * learning_rate);
            b1 = &b1 - &(&db1 * learning_rate);
            w2 = &w2 - &(&dw2 * learning_rate);
            b2 = &b2 - &(&db2 * learning_rate);
        }

        assert_eq!(w1.shape(), &[2, 3]);
        assert_eq!(b2.shape(), &[1]);
        let (first, last) = (losses[0], losses[losses.len() - 1]);
        assert!(last.is_finite());
        assert!(last < first, "loss went from {first} to {last}");
    });
}

#[test]
fn test_rows_alias_the_parent() {
    let grid = zeros::<i32>(&[3, 4]).unwrap();
    for (i, row) in grid.rows().enumerate() {
        row.set(i, 7).unwrap();
    }
    assert_eq!(grid.count(), 3);
    assert_eq!(grid.at2(2, 2).unwrap(), 7);

    let middle = grid.row(1).unwrap();
    let sum = &middle + &middle;
    assert!(!sum.shares_storage(&grid));
    assert_eq!(sum.at(1).unwrap(), 14);
}

#[test]
fn test_views_are_shared_across_threads() {
    let a = zeros::<i32>(&[4, 1000]).unwrap();
    thread::scope(|s| {
        for (i, row) in a.rows().enumerate() {
            s.spawn(move || {
                for j in 0..row.length().unwrap() {
                    row.set(j, i as i32 + 1).unwrap();
                }
            });
        }
    });
    assert_eq!(a.sum_axis(1).unwrap(), array![1000, 2000, 3000, 4000]);

    let b = ones::<f32>(&[256]).unwrap();
    let totals: Vec<f32> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| (&b + &b).sum()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(totals, vec![512.0; 4]);
}
