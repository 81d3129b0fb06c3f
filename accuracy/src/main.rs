use std::error::Error;
use std::path::Path;
use std::time::{Instant, SystemTime};

use fstspell::align::WeightedAligner;
use fstspell::automaton::Automaton;
use fstspell::io::{load_cost_table, load_vocabulary};
use fstspell::speller::suggestion::Suggestion;
use fstspell::speller::{FstSpeller, Speller, SpellerConfig};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use structopt::clap::{App, AppSettings, Arg};

static CFG: SpellerConfig = SpellerConfig::default();

fn load_words(
    path: &str,
    max_words: Option<usize>,
) -> Result<Vec<(String, String)>, Box<dyn Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_path(path)?;

    Ok(rdr
        .records()
        .filter_map(Result::ok)
        .filter_map(|r| {
            r.get(0)
                .and_then(|x| r.get(1).map(|y| (x.to_string(), y.to_string())))
        })
        .take(max_words.unwrap_or(std::usize::MAX))
        .collect())
}

#[derive(Debug, Default, Serialize, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
struct Time {
    secs: u64,
    subsec_nanos: u32,
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let ms = self.secs * 1000 + (self.subsec_nanos as u64 / 1_000_000);
        write!(f, "{}ms", ms)
    }
}

impl Time {
    fn duration(&self) -> std::time::Duration {
        std::time::Duration::new(self.secs, self.subsec_nanos)
    }
}

impl From<std::time::Duration> for Time {
    fn from(d: std::time::Duration) -> Self {
        Time {
            secs: d.as_secs(),
            subsec_nanos: d.subsec_nanos(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AccuracyResult<'a> {
    input: &'a str,
    expected: &'a str,
    distance: Option<f64>,
    suggestions: Vec<Suggestion>,
    position: Option<usize>,
    time: Time,
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    lexicon: &'a str,
    weights: &'a str,
    lexicon_states: usize,
    corrector_transitions: usize,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    metadata: Metadata<'a>,
    config: &'a SpellerConfig,
    summary: Summary,
    results: Vec<AccuracyResult<'a>>,
    start_timestamp: Time,
    total_time: Time,
}

#[derive(Serialize, Default, Debug, Clone)]
struct Summary {
    total_words: u32,
    first_position: u32,
    top_five: u32,
    any_position: u32,
    no_suggestions: u32,
    only_wrong: u32,
    slowest_lookup: Time,
    fastest_lookup: Time,
    average_lookup: Time,
    average_distance: f64,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let percent =
            |v: u32| -> String { format!("{:.2}%", v as f32 / self.total_words as f32 * 100f32) };

        write!(
            f,
            "[#1] {} [^5] {} [any] {} [none] {} [wrong] {} [fast] {} [avg] {} [slow] {} [dist] {:.2}",
            percent(self.first_position),
            percent(self.top_five),
            percent(self.any_position),
            percent(self.no_suggestions),
            percent(self.only_wrong),
            self.fastest_lookup,
            self.average_lookup,
            self.slowest_lookup,
            self.average_distance
        )
    }
}

impl Summary {
    fn new<'a>(results: &[AccuracyResult<'a>]) -> Summary {
        let mut summary = Summary::default();

        results.iter().for_each(|result| {
            summary.total_words += 1;

            if let Some(position) = result.position {
                summary.any_position += 1;

                if position == 0 {
                    summary.first_position += 1;
                }

                if position < 5 {
                    summary.top_five += 1;
                }
            } else if result.suggestions.is_empty() {
                summary.no_suggestions += 1;
            } else {
                summary.only_wrong += 1;
            }
        });

        summary.slowest_lookup = results.iter().map(|x| x.time).max().unwrap_or_default();
        summary.fastest_lookup = results.iter().map(|x| x.time).min().unwrap_or_default();

        if !results.is_empty() {
            let n = results.len() as u32;
            let total: std::time::Duration = results.iter().map(|x| x.time.duration()).sum();
            summary.average_lookup = Time::from(total / n);

            let distances: Vec<f64> = results.iter().filter_map(|x| x.distance).collect();
            if !distances.is_empty() {
                summary.average_distance = distances.iter().sum::<f64>() / distances.len() as f64;
            }
        }

        summary
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let matches = App::new("fstspell-accuracy")
        .setting(AppSettings::ArgRequiredElseHelp)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Accuracy testing for fstspell.")
        .arg(
            Arg::with_name("config")
                .short("c")
                .takes_value(true)
                .help("Provide JSON config file to override test defaults"),
        )
        .arg(
            Arg::with_name("words")
                .value_name("WORDS")
                .help("The 'input -> expected' list in tab-delimited value file (TSV)"),
        )
        .arg(
            Arg::with_name("lexicon")
                .value_name("LEXICON")
                .help("Whitespace-separated word list to correct towards"),
        )
        .arg(
            Arg::with_name("weights")
                .value_name("WEIGHTS")
                .help("Learned edit weights (JSON) from `fstspell train`"),
        )
        .arg(
            Arg::with_name("json-output")
                .short("o")
                .value_name("JSON-OUTPUT")
                .help("The file path for the JSON report output"),
        )
        .arg(
            Arg::with_name("max-words")
                .short("w")
                .takes_value(true)
                .help("Truncate typos list to max number of words specified"),
        )
        .get_matches();

    let cfg: SpellerConfig = match matches.value_of("config") {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            serde_json::from_reader(file)?
        }
        None => CFG.clone(),
    };

    let lexicon_path = matches.value_of("lexicon");
    let weights_path = matches.value_of("weights");
    let (lexicon_path, weights_path) = match (lexicon_path, weights_path) {
        (Some(l), Some(w)) => (l, w),
        _ => {
            eprintln!("No lexicon or weights given; aborting.");
            std::process::exit(1);
        }
    };

    let lexicon = Automaton::from_words(&load_vocabulary(Path::new(lexicon_path))?);
    let table = load_cost_table(Path::new(weights_path))?;
    let speller = FstSpeller::new(lexicon, &table, cfg.clone())?;

    let words = match matches.value_of("words") {
        Some(path) => load_words(
            path,
            matches
                .value_of("max-words")
                .and_then(|x| x.parse::<usize>().ok()),
        )?,
        None => {
            eprintln!("No word list for given path; aborting.");
            std::process::exit(1);
        }
    };

    let pb = ProgressBar::new(words.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{pos}/{len} [{percent}%] {wide_bar} {elapsed_precise}"),
    );

    let aligner = WeightedAligner::default();
    let start_time = Instant::now();
    let results = words
        .par_iter()
        .progress_with(pb)
        .map(|(input, expected)| {
            let now = Instant::now();
            let suggestions = speller.clone().suggest_with_config(input, &cfg);
            let time = Time::from(now.elapsed());

            let position = suggestions.iter().position(|x| x.value() == expected.as_str());

            let distance = aligner.distance(input, expected).ok();
            AccuracyResult {
                input,
                expected,
                distance,
                time,
                suggestions,
                position,
            }
        })
        .collect::<Vec<_>>();

    let total_time = Time::from(start_time.elapsed());
    let start_timestamp = Time::from(SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?);

    let summary = Summary::new(&results);
    println!("{}", summary);

    if let Some(path) = matches.value_of("json-output") {
        let output = std::fs::File::create(path)?;
        let report = Report {
            metadata: Metadata {
                lexicon: lexicon_path,
                weights: weights_path,
                lexicon_states: speller.lexicon().state_count(),
                corrector_transitions: speller.corrector().transition_count(),
            },
            config: &cfg,
            summary,
            results,
            start_timestamp,
            total_time,
        };
        println!("Writing JSON report…");
        serde_json::to_writer_pretty(output, &report)?;
    }

    println!("Done!");
    Ok(())
}
