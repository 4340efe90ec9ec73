use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use rpncalc::{AngleMode, DisplayTokens, Error, Stage};

/// Evaluates infix arithmetic expressions, e.g. `calc "2 ^ 3 ^ 2"` or
/// `calc -- -sin(30) * 2`.
#[derive(Parser, Debug)]
#[command(name = "calc", version, subcommand_negates_reqs = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    expression: Expression,

    /// Use radians for trigonometric functions instead of degrees
    #[arg(short, long, global = true)]
    radians: bool,

    /// Print debug output to stderr; repeat for a trace of every stack step
    #[arg(short, long, action = ArgAction::Count, global = true)]
    debug: u8,

    /// Give up on evaluation after this many milliseconds
    #[arg(short, long, value_name = "MS", default_value_t = 5000, global = true)]
    timeout: u64,

    /// Digits printed after the decimal point
    #[arg(short, long, value_name = "N", default_value_t = 15, global = true)]
    precision: usize,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the tokens of an expression
    Tokenize(Expression),
    /// Print an expression in reverse polish notation
    Rpn(Expression),
}

#[derive(clap::Args, Debug)]
struct Expression {
    /// Expression words, joined with spaces
    #[arg(
        value_name = "EXPRESSION",
        required = true,
        num_args = 1..,
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    words: Vec<String>,
}

impl Expression {
    fn text(&self) -> String {
        let words = match self.words.split_first() {
            Some((first, rest)) if first == "calc" => rest,
            _ => &self.words[..],
        };
        words.join(" ").trim().to_string()
    }
}

/// Routes the library's events to stderr; `-d` shows debug, `-dd` trace.
fn init_logging(debug: u8) {
    use tracing_subscriber::{
        filter::{LevelFilter, Targets},
        fmt::Layer,
        prelude::*,
    };

    let level = match debug {
        0 => LevelFilter::OFF,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            Layer::new()
                .with_ansi(false)
                .with_writer(std::io::stderr)
                .with_filter(Targets::new().with_targets([("rpncalc", level), ("calc", level)])),
        )
        .init();
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    match &args.command {
        Some(Commands::Tokenize(expression)) => {
            let input = expression.text();
            let tokens = rpncalc::tokenize(&input).unwrap_or_else(|e| fail(e, &input));
            for token in &tokens {
                println!("{token} @{}", token.offset);
            }
        }
        Some(Commands::Rpn(expression)) => {
            let input = expression.text();
            let rpn = rpncalc::tokenize(&input)
                .and_then(|tokens| rpncalc::to_rpn(&tokens))
                .unwrap_or_else(|e| fail(e, &input));
            println!("{}", DisplayTokens(&rpn));
        }
        None => {
            let input = args.expression.text();
            tracing::debug!("input: {input:?}");
            let mode = if args.radians {
                AngleMode::Radians
            } else {
                AngleMode::Degrees
            };
            let timeout = Duration::from_millis(args.timeout);
            let result = rpncalc::tokenize(&input)
                .and_then(|tokens| rpncalc::to_rpn(&tokens))
                .and_then(|rpn| rpncalc::evaluate_within(&rpn, mode, timeout))
                .unwrap_or_else(|e| fail(e, &input));
            println!("{:.*}", args.precision, result);
        }
    }
    Ok(())
}

/// Renders `error` against the input and exits: 65 for malformed input,
/// 70 when a well-formed expression cannot be computed.
fn fail(error: Error, input: &str) -> ! {
    let code = match error.stage() {
        Stage::Lex | Stage::Syntax => 65,
        Stage::Eval => 70,
    };
    eprintln!("{:?}", error.with_source("<expression>", input));
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn help_names_the_built_binary() {
        assert_eq!(Args::command().get_name(), env!("CARGO_BIN_NAME"));
    }

    #[test]
    fn flags_before_the_expression() {
        let args = Args::try_parse_from(["calc", "-r", "-dd", "-p", "3", "--", "-sin(30)", "*", "2"])
            .expect("valid arguments");
        assert!(args.radians);
        assert_eq!(args.debug, 2);
        assert_eq!(args.precision, 3);
        assert_eq!(args.expression.text(), "-sin(30) * 2");
    }

    #[test]
    fn leading_calc_word_is_dropped() {
        let args = Args::try_parse_from(["calc", "calc", "1", "+", "1"]).expect("valid arguments");
        assert_eq!(args.expression.text(), "1 + 1");
    }
}
