use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::Read;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

use super::{CalculatorKind, calculate, calculators, run_http_server};
use crate::core::CalcError;

#[derive(Parser, Debug)]
#[command(
    name = "fincalc",
    version,
    about = "Personal finance calculators: SIP, EMI, FIRE, tax planning and more"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Emit logs as JSON lines on stderr")]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the calculators over HTTP.
    Serve {
        #[arg(long, env = "FINCALC_PORT", default_value_t = 8080)]
        port: u16,
        #[arg(long, env = "FINCALC_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
        bind: IpAddr,
    },
    /// Run one calculator on a JSON input and print the report.
    Calc {
        calculator: CalculatorKind,
        #[arg(long, help = "Input JSON; read from stdin when omitted")]
        input: Option<String>,
        #[arg(long)]
        pretty: bool,
    },
    /// List the available calculators.
    List,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error("failed to read input: {0}")]
    Input(std::io::Error),
    #[error("server error: {0}")]
    Server(std::io::Error),
    #[error("input is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// 1 for rejected input values, 2 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Calc(CalcError::Validation(_)) => 1,
            _ => 2,
        }
    }
}

pub async fn execute(command: Command) -> Result<(), CliError> {
    match command {
        Command::Serve { port, bind } => {
            run_http_server(SocketAddr::new(bind, port))
                .await
                .map_err(CliError::Server)?;
        }
        Command::Calc {
            calculator,
            input,
            pretty,
        } => {
            let raw = match input {
                Some(json) => json,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .map_err(CliError::Input)?;
                    buf
                }
            };
            let report = run_calc(calculator, &raw)?;
            let text =
                render(&report, pretty).map_err(|e| CalcError::Encoding(e.to_string()))?;
            println!("{text}");
        }
        Command::List => {
            for info in calculators() {
                println!("{:<18} {}", info.name, info.title);
            }
        }
    }
    Ok(())
}

fn run_calc(calculator: CalculatorKind, raw: &str) -> Result<Value, CliError> {
    let payload = serde_json::from_str::<Value>(raw)?;
    Ok(calculate(calculator, payload)?)
}

fn render(report: &Value, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_calc_with_inline_input() {
        let cli = Cli::try_parse_from([
            "fincalc",
            "calc",
            "mf-vs-nps",
            "--input",
            "{}",
            "--pretty",
            "--log-json",
        ])
        .expect("valid args");
        assert!(cli.log_json);
        let Command::Calc {
            calculator,
            input,
            pretty,
        } = cli.command
        else {
            panic!("expected calc command");
        };
        assert_eq!(calculator, CalculatorKind::MfVsNps);
        assert_eq!(input.as_deref(), Some("{}"));
        assert!(pretty);
    }

    #[test]
    fn rejects_unknown_calculator_name() {
        assert!(Cli::try_parse_from(["fincalc", "calc", "lottery"]).is_err());
    }

    #[test]
    fn serve_accepts_explicit_port_and_bind() {
        let cli = Cli::try_parse_from(["fincalc", "serve", "--port", "9000", "--bind", "127.0.0.1"])
            .expect("valid args");
        let Command::Serve { port, bind } = cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(port, 9000);
        assert_eq!(bind, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn validation_failure_exits_with_one() {
        let err = run_calc(
            CalculatorKind::Sip,
            r#"{"monthlyInvestment": 5000, "years": 99, "expectedReturn": 12}"#,
        )
        .expect_err("years out of range");
        assert_eq!(err.exit_code(), 1);
        assert_eq!(run_calc(CalculatorKind::Sip, "not json").expect_err("bad json").exit_code(), 2);
    }

    #[test]
    fn render_compact_and_pretty() {
        let report = run_calc(
            CalculatorKind::Emi,
            r#"{"principal": 500000, "annualRate": 9, "termYears": 5}"#,
        )
        .expect("valid emi");
        let compact = render(&report, false).expect("render");
        let pretty = render(&report, true).expect("render");
        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));
        assert_eq!(
            serde_json::from_str::<Value>(&pretty).expect("json"),
            serde_json::from_str::<Value>(&compact).expect("json")
        );
    }
}
