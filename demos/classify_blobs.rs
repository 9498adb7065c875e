use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

use rust_neuralnet::{Activation, Dataset, HyperParametersBuilder};

/// Two square blobs of points, one per class.
fn blobs(per_class: usize, rng: &mut StdRng) -> rust_neuralnet::Result<Dataset> {
    let noise = Uniform::new(-0.25_f32, 0.25);
    let mut examples = Vec::with_capacity(2 * per_class);
    let mut labels = Vec::with_capacity(2 * per_class);

    for _ in 0..per_class {
        examples.push(vec![0.25 + noise.sample(rng), 0.25 + noise.sample(rng)]);
        labels.push(false);
        examples.push(vec![0.75 + noise.sample(rng), 0.75 + noise.sample(rng)]);
        labels.push(true);
    }

    Dataset::from_examples(&examples, &labels)
}

fn main() -> rust_neuralnet::Result<()> {
    // Set RUST_LOG=info to see the periodic cost.
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(0);
    let train = blobs(200, &mut rng)?;
    let test = blobs(50, &mut rng)?;

    // 2 -> 8 -> 4 -> 1 network with every training control switched on.
    let hp = HyperParametersBuilder::new()
        .add_layers(Activation::ReLU, &[8, 4])
        .add_layer(1, Activation::Sigmoid)
        .learning_rate(0.05)
        .iterations(500)
        .regularization_factor(0.01)
        .dropout_keep_probability(0.9)
        .mini_batch_size(64)
        .momentum(0.9)
        .seed(0)
        .build()?;
    print!("{hp}");

    let model = hp.train_model(&train)?;
    println!("final cost: {:.6}", model.final_cost());
    println!("train: {}", model.predict(&train)?);
    println!("test:  {}", model.predict(&test)?);

    Ok(())
}
