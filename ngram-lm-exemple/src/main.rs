use ngram_lm_core::{ModelConfig, NGramLanguageModel};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows the fitting summary
    env_logger::init();

    let training = "the cat sat on the mat. the cat ate the rat. the rat sat on the cat.";

    // Every character that may ever be predicted, seen or not
    let alphabet: Vec<char> = "abcdefghijklmnopqrstuvwxyz .".chars().collect();

    // The configuration can also be deserialized from any serde format
    let mut config = ModelConfig::new(alphabet.len())?;
    config.set_context_size(3);

    let mut model = NGramLanguageModel::from_config(config)?;

    // Querying an unfit model is an error
    match model.query(&['t', 'h']) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    model.fit(training.chars());
    println!(
        "Fitted {} distinct tokens into {} n-grams",
        model.observed_tokens()?,
        model.distinct_ngrams()?
    );

    // Only the last 3 characters (" th") of the context are used
    let context: Vec<char> = "on th".chars().collect();
    let distribution = model.query(&context)?;
    for token in ['e', 'a', 'z'] {
        println!(
            "p({:?} | {:?}) = {:.4} (log {:.4})",
            token,
            context.iter().collect::<String>(),
            distribution.probability(&token),
            distribution.log_probability(&token)
        );
    }

    // Probabilities over the whole alphabet sum to 1
    let sum: f64 = alphabet.iter().map(|token| distribution.probability(token)).sum();
    println!("Sum over the alphabet: {:.6}", sum);

    // Lower perplexity means the sequence looks more like the training data
    for sentence in ["the cat sat on the rat.", "xqz jvk wpf."] {
        let tokens: Vec<char> = sentence.chars().collect();
        println!("Perplexity of {:?}: {:.3}", sentence, model.perplexity(&tokens)?);
    }

    // Generate 5 continuations by sampling one character at a time
    let mut rng = rand::rng();
    for i in 0..5 {
        let mut generated: Vec<char> = "the ".chars().collect();
        while generated.len() < 40 {
            let next = match model.query(&generated)?.sample(&alphabet, &mut rng) {
                Some(c) => *c,
                None => break,
            };
            generated.push(next);
            if next == '.' {
                break;
            }
        }
        println!("Generated {}: {}", i + 1, generated.iter().collect::<String>());
    }

    Ok(())
}
