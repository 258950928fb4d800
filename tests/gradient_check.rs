use ndarray::Array2;

use rust_dnn::{
    Gradients, LayerParams, LayerSpec, OutputActivation, Parameters, change_to_multi_class,
    compute_cost_with_l2, initialize_parameters_he_with_seed, model_backward_with_l2,
    model_forward,
};

const EPS: f64 = 1e-6;
const TOL: f64 = 1e-5;

/// `(layer, is_bias, (row, col), analytic, numeric)`.
type GradientPair = (usize, bool, (usize, usize), f64, f64);

fn inputs(rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        let v = ((3 * i + 7 * j) % 11) as f64 / 10.0;
        v - 0.45
    })
}

fn cost_at(
    params: &Parameters,
    x: &Array2<f64>,
    y: &Array2<f64>,
    lambda: f64,
    output: OutputActivation,
) -> f64 {
    let (al, _) = model_forward(x, params, output).unwrap();
    compute_cost_with_l2(&al, y, params, lambda, output).unwrap()
}

/// Rebuild `params` with one entry nudged by `delta`.
fn nudged(
    params: &Parameters,
    layer: usize,
    bias: bool,
    idx: (usize, usize),
    delta: f64,
) -> Parameters {
    let mut layers: Vec<LayerParams> = params.layers().to_vec();
    let target = if bias {
        &mut layers[layer].biases
    } else {
        &mut layers[layer].weights
    };
    target[idx] += delta;
    Parameters::from_layers(layers).unwrap()
}

/// Analytic and centered-difference gradients for every weight and bias.
fn gradient_pairs(
    params: &Parameters,
    grads: &Gradients,
    x: &Array2<f64>,
    y: &Array2<f64>,
    lambda: f64,
    output: OutputActivation,
) -> Vec<GradientPair> {
    let mut pairs = Vec::new();

    for (l, layer) in params.layers().iter().enumerate() {
        for (bias, shape) in [(false, layer.weights.dim()), (true, layer.biases.dim())] {
            for r in 0..shape.0 {
                for c in 0..shape.1 {
                    let plus = cost_at(&nudged(params, l, bias, (r, c), EPS), x, y, lambda, output);
                    let minus =
                        cost_at(&nudged(params, l, bias, (r, c), -EPS), x, y, lambda, output);
                    let numeric = (plus - minus) / (2.0 * EPS);
                    let analytic = if bias {
                        grads.d_biases(l).unwrap()[[r, c]]
                    } else {
                        grads.d_weights(l).unwrap()[[r, c]]
                    };
                    pairs.push((l, bias, (r, c), analytic, numeric));
                }
            }
        }
    }
    pairs
}

/// `||a - n|| / (||a|| + ||n||)` over every parameter at once.
fn relative_difference(pairs: &[GradientPair]) -> f64 {
    let diff = pairs.iter().map(|p| (p.3 - p.4).powi(2)).sum::<f64>().sqrt();
    let norm_a = pairs.iter().map(|p| p.3 * p.3).sum::<f64>().sqrt();
    let norm_n = pairs.iter().map(|p| p.4 * p.4).sum::<f64>().sqrt();
    diff / (norm_a + norm_n)
}

fn check(widths: Vec<usize>, labels: &[usize], lambda: f64, output: OutputActivation) {
    let spec = LayerSpec::new(widths).unwrap();
    let params = initialize_parameters_he_with_seed(&spec, 3).unwrap();
    let x = inputs(spec.input_dim(), labels.len());
    let y = if spec.output_dim() == 1 {
        Array2::from_shape_vec((1, labels.len()), labels.iter().map(|&l| l as f64).collect())
            .unwrap()
    } else {
        change_to_multi_class(labels, spec.output_dim()).unwrap()
    };

    let (al, cache) = model_forward(&x, &params, output).unwrap();
    let grads = model_backward_with_l2(&al, &y, &cache, &params, lambda, output).unwrap();
    assert_eq!(grads.num_layers(), params.num_layers());

    let pairs = gradient_pairs(&params, &grads, &x, &y, lambda, output);
    for &(layer, bias, idx, analytic, numeric) in &pairs {
        let kind = if bias { "bias" } else { "weight" };
        assert!(
            (analytic - numeric).abs() < TOL,
            "layer {layer} {kind} {idx:?}: analytic {analytic:e} vs numeric {numeric:e} (lambda = {lambda})"
        );
    }

    let diff = relative_difference(&pairs);
    assert!(diff < TOL, "relative gradient difference {diff:e} (lambda = {lambda})");
}

#[test]
fn backward_matches_numeric_gradients_without_regularization() {
    check(vec![3, 4, 1], &[1, 0, 1, 1, 0], 0.0, OutputActivation::Sigmoid);
}

#[test]
fn backward_matches_numeric_gradients_with_regularization() {
    check(vec![3, 4, 1], &[1, 0, 1, 1, 0], 0.7, OutputActivation::Sigmoid);
}

#[test]
fn backward_matches_numeric_gradients_deeper_multi_output() {
    check(vec![3, 5, 4, 3], &[0, 2, 1, 2, 0, 1], 0.3, OutputActivation::Sigmoid);
}

#[test]
fn softmax_backward_matches_numeric_gradients() {
    check(vec![3, 4, 3], &[0, 2, 1, 2, 0, 1], 0.0, OutputActivation::Softmax);
    check(vec![3, 4, 3], &[0, 2, 1, 2, 0, 1], 1.5, OutputActivation::Softmax);
}
