use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use gumdrop::Options;
use serde::Serialize;

use fstspell::align::{EditCostEstimator, EstimatorConfig};
use fstspell::automaton::Automaton;
use fstspell::dot::{automaton_to_dot, transducer_to_dot};
use fstspell::io::{load_cost_table, load_training_pairs, load_vocabulary, save_cost_table};
use fstspell::speller::suggestion::Suggestion;
use fstspell::speller::{error_model, FstSpeller, Speller, SpellerConfig};
use fstspell::types::Weight;

trait OutputWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool);
    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]);
    fn finish(&mut self);
}

struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        println!(
            "Input: {}\t\t[{}]",
            &word,
            if is_correct { "CORRECT" } else { "INCORRECT" }
        );
    }

    fn write_suggestions(&mut self, _word: &str, suggestions: &[Suggestion]) {
        for sugg in suggestions {
            println!("{}\t\t{}\t{:.6}", sugg.value, sugg.weight, sugg.score());
        }
        println!();
    }

    fn finish(&mut self) {}
}

#[derive(Serialize)]
struct SuggestionRequest {
    word: String,
    is_correct: bool,
    suggestions: Vec<Suggestion>,
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<SuggestionRequest>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }
}

impl OutputWriter for JsonWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        self.results.push(SuggestionRequest {
            word: word.to_owned(),
            is_correct,
            suggestions: vec![],
        });
    }

    fn write_suggestions(&mut self, _word: &str, suggestions: &[Suggestion]) {
        if let Some(last) = self.results.last_mut() {
            last.suggestions = suggestions.to_vec();
        }
    }

    fn finish(&mut self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}", e),
        }
    }
}

fn run(
    speller: Arc<FstSpeller>,
    words: Vec<String>,
    writer: &mut dyn OutputWriter,
    is_always_suggesting: bool,
    suggest_cfg: &SpellerConfig,
) {
    for word in words {
        let is_correct = speller.clone().is_correct(&word);
        writer.write_correction(&word, is_correct);

        if is_always_suggesting || !is_correct {
            let suggestions = speller.clone().suggest_with_config(&word, suggest_cfg);
            writer.write_suggestions(&word, &suggestions);
        }
    }
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "learn edit costs from misspelling/correction pairs")]
    Train(TrainArgs),

    #[options(help = "get suggestions for provided input")]
    Suggest(SuggestArgs),

    #[options(help = "check if provided input is in the lexicon")]
    Check(CheckArgs),

    #[options(help = "print a lexicon or error model in Graphviz format")]
    Dot(DotArgs),
}

#[derive(Debug, Options)]
struct TrainArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "tab-separated misspelling/correction pairs", required)]
    pairs: PathBuf,

    #[options(help = "where to write the learned weights (JSON)", required)]
    output: PathBuf,

    #[options(help = "Lidstone smoothing constant")]
    smoothing: Option<f64>,

    #[options(short = "i", help = "maximum number of re-estimation passes")]
    max_iterations: Option<usize>,
}

#[derive(Debug, Options)]
struct SuggestArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "whitespace-separated word list", required)]
    lexicon: PathBuf,

    #[options(help = "learned weights (JSON) from `train`", required)]
    weights: PathBuf,

    #[options(short = "S", help = "always show suggestions even if word is correct")]
    always_suggest: bool,

    #[options(short = "m", help = "maximum weight limit for suggestions")]
    max_weight: Option<f32>,

    #[options(help = "maximum number of results")]
    nbest: Option<usize>,

    #[options(no_short, help = "Lidstone smoothing constant for the error model")]
    smoothing: Option<f64>,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct CheckArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "whitespace-separated word list", required)]
    lexicon: PathBuf,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct DotArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "whitespace-separated word list")]
    lexicon: Option<PathBuf>,

    #[options(help = "minimize the lexicon before printing")]
    minimize: bool,

    #[options(help = "print the error model of these weights instead")]
    weights: Option<PathBuf>,
}

fn read_inputs(inputs: Vec<String>) -> anyhow::Result<Vec<String>> {
    if !inputs.is_empty() {
        return Ok(inputs);
    }

    eprintln!("Reading from stdin...");
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;

    Ok(buffer.split_whitespace().map(str::to_string).collect())
}

fn load_lexicon(path: &Path) -> anyhow::Result<Automaton> {
    let words = load_vocabulary(path)
        .with_context(|| format!("loading lexicon {}", path.display()))?;
    log::info!("{} words in lexicon", words.len());

    Ok(Automaton::from_words(words.iter().map(|w| w.to_lowercase())))
}

fn train(args: TrainArgs) -> anyhow::Result<()> {
    let mut config = EstimatorConfig::default();
    if let Some(v) = args.smoothing {
        config.smoothing = v;
    }
    if let Some(v) = args.max_iterations {
        config.max_iterations = v;
    }

    let pairs = load_training_pairs(&args.pairs)
        .with_context(|| format!("loading pairs {}", args.pairs.display()))?;
    let estimate = EditCostEstimator::new(&pairs, config).estimate()?;

    if estimate.converged {
        eprintln!("Converged after {} iterations.", estimate.iterations);
    } else {
        eprintln!(
            "Did not converge after {} iterations; writing last table.",
            estimate.iterations
        );
    }

    save_cost_table(&args.output, &estimate.table)
        .with_context(|| format!("writing {}", args.output.display()))?;

    Ok(())
}

fn suggest(args: SuggestArgs) -> anyhow::Result<()> {
    let mut suggest_cfg = SpellerConfig::default();

    if let Some(v) = args.nbest {
        if v == 0 {
            suggest_cfg.n_best = None;
        } else {
            suggest_cfg.n_best = Some(v);
        }
    }

    if let Some(v) = args.max_weight.filter(|x| x >= &0.0) {
        if v == 0.0 {
            suggest_cfg.max_weight = None;
        } else {
            suggest_cfg.max_weight = Some(Weight(v));
        }
    }

    if let Some(v) = args.smoothing {
        suggest_cfg.smoothing = v;
    }

    let mut writer: Box<dyn OutputWriter> = if args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    };

    let lexicon = load_lexicon(&args.lexicon)?;
    let table = load_cost_table(&args.weights)
        .with_context(|| format!("loading weights {}", args.weights.display()))?;
    let speller = FstSpeller::new(lexicon, &table, suggest_cfg.clone())?;

    let words = read_inputs(args.inputs)?;
    run(
        speller,
        words,
        &mut *writer,
        args.always_suggest,
        &suggest_cfg,
    );

    writer.finish();

    Ok(())
}

fn check(args: CheckArgs) -> anyhow::Result<()> {
    let lexicon = load_lexicon(&args.lexicon)?;
    let mut writer = StdoutWriter;

    for word in read_inputs(args.inputs)? {
        let is_correct = lexicon.recognize(&word.to_lowercase());
        writer.write_correction(&word, is_correct);
    }

    writer.finish();
    Ok(())
}

fn dot(args: DotArgs) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let out = stdout.lock();

    match (args.weights, args.lexicon) {
        (Some(path), _) => {
            let table = load_cost_table(&path)
                .with_context(|| format!("loading weights {}", path.display()))?;
            let fst = error_model(&table, SpellerConfig::default().smoothing)?;
            transducer_to_dot(&fst, out)?;
        }
        (None, Some(path)) => {
            let mut lexicon = load_lexicon(&path)?;
            if args.minimize {
                lexicon.minimize()?;
            }
            automaton_to_dot(&lexicon, out)?;
        }
        (None, None) => anyhow::bail!("either --lexicon or --weights is required"),
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse_args_default_or_exit();

    match args.command {
        None => Ok(()),
        Some(Command::Train(args)) => train(args),
        Some(Command::Suggest(args)) => suggest(args),
        Some(Command::Check(args)) => check(args),
        Some(Command::Dot(args)) => dot(args),
    }
}
