use super::{error_message, rates, ui};
use crate::core::rates::swap;
use crate::core::{ConversionError, ConversionService};
use anyhow::{Context, Result};
use std::io::Write;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  amount <value>   set the amount to convert
  from <code>      set the source currency
  to <code>        set the target currency
  swap             swap source and target
  convert          convert the amount
  clear            reset the form
  refresh          fetch real-time rates in the background
  rates            show the current rates
  help             show this help
  quit             exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Amount(String),
    From(String),
    To(String),
    Swap,
    Convert,
    Clear,
    Refresh,
    Rates,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, arg) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, arg)| (name, arg.trim()));

        let with_arg = |make: fn(String) -> Command| {
            if arg.is_empty() {
                Err(format!("'{name}' needs a value"))
            } else {
                Ok(make(arg.to_string()))
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "amount" | "a" => with_arg(Command::Amount),
            "from" | "f" => with_arg(Command::From),
            "to" | "t" => with_arg(Command::To),
            "swap" | "s" => Ok(Command::Swap),
            "convert" | "c" => Ok(Command::Convert),
            "clear" => Ok(Command::Clear),
            "refresh" | "r" => Ok(Command::Refresh),
            "rates" => Ok(Command::Rates),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            "" => Err("Type 'help' for a list of commands".to_string()),
            other => Err(format!("Unknown command '{other}'")),
        }
    }
}

/// What the session loop should do after a command.
#[derive(Debug, PartialEq)]
pub enum Step {
    Show(String),
    Refresh,
    Quit,
}

/// Input state of the conversion form.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub amount: String,
    pub source: String,
    pub target: String,
    pub result: Option<String>,
}

impl Form {
    pub fn new(codes: &[String]) -> Self {
        let mut form = Form {
            amount: String::new(),
            source: String::new(),
            target: String::new(),
            result: None,
        };
        form.clear(codes);
        form
    }

    /// Empties the amount and result and selects the first two codes.
    pub fn clear(&mut self, codes: &[String]) {
        let first = codes.first().cloned().unwrap_or_default();
        let second = codes.get(1).cloned().unwrap_or_else(|| first.clone());
        self.amount.clear();
        self.source = first;
        self.target = second;
        self.result = None;
    }

    pub fn apply(&mut self, command: Command, service: &ConversionService) -> Step {
        match command {
            Command::Amount(amount) => {
                self.amount = amount;
                Step::Show(format!("Amount: {}", self.amount))
            }
            Command::From(code) => match select(&code, service) {
                Ok(code) => {
                    self.source = code;
                    Step::Show(format!("From: {}", self.source))
                }
                Err(e) => Step::Show(rejected(&e)),
            },
            Command::To(code) => match select(&code, service) {
                Ok(code) => {
                    self.target = code;
                    Step::Show(format!("To: {}", self.target))
                }
                Err(e) => Step::Show(rejected(&e)),
            },
            Command::Swap => {
                let (source, target) = swap(
                    std::mem::take(&mut self.source),
                    std::mem::take(&mut self.target),
                );
                self.source = source;
                self.target = target;
                Step::Show(format!("From: {}  To: {}", self.source, self.target))
            }
            Command::Convert => {
                match service.convert_input(&self.amount, &self.source, &self.target) {
                    Ok(result) => {
                        let text = result.to_string();
                        self.result = Some(text.clone());
                        Step::Show(ui::style_text(&text, ui::StyleType::Result))
                    }
                    Err(e) => Step::Show(rejected(&e)),
                }
            }
            Command::Clear => {
                self.clear(&service.codes());
                Step::Show(format!("From: {}  To: {}", self.source, self.target))
            }
            Command::Refresh => Step::Refresh,
            Command::Rates => Step::Show(rates::render(
                &service.table(),
                &service.status(),
                service.last_updated(),
            )),
            Command::Help => Step::Show(HELP.to_string()),
            Command::Quit => Step::Quit,
        }
    }

    fn prompt(&self) -> String {
        let amount = if self.amount.is_empty() {
            "_"
        } else {
            self.amount.as_str()
        };
        format!("[{amount} {} -> {}] > ", self.source, self.target)
    }
}

fn select(code: &str, service: &ConversionService) -> Result<String, ConversionError> {
    let code = code.trim().to_ascii_uppercase();
    if service.table().contains(&code) {
        Ok(code)
    } else {
        Err(ConversionError::InvalidCurrency(code))
    }
}

fn rejected(error: &ConversionError) -> String {
    debug!(error = %error, "Input rejected");
    ui::style_text(error_message(error), ui::StyleType::Error)
}

/// Runs the form session on stdin until `quit` or end of input.
///
/// Rates are refreshed on background tasks; the prompt picks up the latest
/// status each time it is drawn.
pub async fn run(service: &ConversionService) -> Result<()> {
    let _ = service.spawn_refresh();

    let mut form = Form::new(&service.codes());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "{}\n{}\n",
        ui::style_text("Currency Converter", ui::StyleType::Title),
        HELP
    );

    loop {
        println!("{}", ui::status_text(&service.status()));
        print!("{}", form.prompt());
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let step = match line.parse::<Command>() {
            Ok(command) => form.apply(command, service),
            Err(message) => Step::Show(ui::style_text(&message, ui::StyleType::Error)),
        };

        match step {
            Step::Show(text) => println!("{text}"),
            Step::Refresh => {
                let _ = service.spawn_refresh();
            }
            Step::Quit => break,
        }
    }

    Ok(())
}
