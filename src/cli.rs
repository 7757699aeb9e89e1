use anyhow::Context;
use clap::{Args, Parser, Subcommand, builder::PossibleValuesParser};
use tracing::{Level, info};

use crate::{
    codec::{OrderField, WireFormat},
    orders::{Order, Side},
};

/// Encode, decode and classify order records
#[derive(Parser, Debug)]
#[command(name = "order-wire")]
#[command(version, about = "Encode, decode and classify single-line order records")]
pub struct Cli {
    /// Refuse to encode text containing the delimiter instead of escaping it
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build an order from flags and print its record
    Encode {
        #[command(flatten)]
        order: OrderArgs,

        /// Fail unless the order passes the validity check
        #[arg(long)]
        require_valid: bool,
    },

    /// Encode an order given as JSON
    FromJson {
        json: String,

        /// Fail unless the order passes the validity check
        #[arg(long)]
        require_valid: bool,
    },

    /// Decode a record and print the order as JSON
    Decode { record: String },

    /// Print order type, validity and fill status of a record
    Classify { record: String },

    /// Print the positional field layout
    Layout,
}

#[derive(Args, Debug)]
pub struct OrderArgs {
    #[arg(long)]
    pub symbol: String,

    ///BUY or SELL
    #[arg(long, default_value = "buy", value_parser = PossibleValuesParser::new(["buy", "sell"]))]
    pub side: String,

    /// Quantity (sign is up to the caller)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub size: i32,

    /// Limit price, 0 for none
    #[arg(long, default_value_t = 0.0)]
    pub price: f64,

    /// Stop price, 0 for none
    #[arg(long, default_value_t = 0.0)]
    pub stop: f64,

    #[arg(long, default_value_t = 0)]
    pub id: u64,

    #[arg(long)]
    pub account: Option<String>,
    #[arg(long)]
    pub exchange: Option<String>,
    #[arg(long)]
    pub comment: Option<String>,
    #[arg(long)]
    pub security: Option<String>,
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long)]
    pub localsymbol: Option<String>,
    /// Time in force
    #[arg(long)]
    pub tif: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub date: i32,
    #[arg(long, default_value_t = 0)]
    pub time: i32,
    #[arg(long, default_value_t = 0)]
    pub sec: i32,
}

impl OrderArgs {
    fn to_order(&self) -> Order {
        let side = match self.side.as_str() {
            "buy" => Side::Buy,
            "sell" => Side::Sell,
            _ => unreachable!(),
        };
        Order {
            id: self.id,
            size: self.size,
            price: self.price,
            stop: self.stop,
            side,
            symbol: self.symbol.clone(),
            localsymbol: self.localsymbol.clone().unwrap_or_default(),
            security: self.security.clone().unwrap_or_default(),
            exchange: self.exchange.clone().unwrap_or_default(),
            account: self.account.clone().unwrap_or_default(),
            currency: self.currency.clone().unwrap_or_default(),
            comment: self.comment.clone().unwrap_or_default(),
            tif: self.tif.clone().unwrap_or_default(),
            date: self.date,
            time: self.time,
            sec: self.sec,
        }
    }
}

fn encode_order(format: &WireFormat, order: &Order, require_valid: bool) -> anyhow::Result<String> {
    if require_valid {
        order.validate()?;
    }
    let record = format
        .encode(order)
        .with_context(|| format!("failed to encode order {}", order.id))?;
    Ok(record)
}

fn classify(order: &Order) -> String {
    let validity = match order.validate() {
        Ok(()) => "true".to_string(),
        Err(e) => format!("false ({})", e),
    };
    format!(
        "type: {}\nvalid: {}\nfill: {}",
        order.order_type(),
        validity,
        order.fill_status()
    )
}

fn layout() -> String {
    OrderField::ALL
        .iter()
        .map(|f| {
            let kind = if f.is_text() { "text" } else { "value" };
            format!("{:>2} {:<12} {}", f.index(), f.name(), kind)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs one command and returns what should be printed to stdout.
pub fn execute(cli: &Cli) -> anyhow::Result<String> {
    let format = if cli.strict {
        WireFormat::strict()
    } else {
        WireFormat::default()
    };
    match &cli.command {
        Commands::Encode {
            order,
            require_valid,
        } => encode_order(&format, &order.to_order(), *require_valid),
        Commands::FromJson {
            json,
            require_valid,
        } => {
            let order: Order = serde_json::from_str(json).context("invalid order JSON")?;
            encode_order(&format, &order, *require_valid)
        }
        Commands::Decode { record } => {
            let order = format.decode(record).context("failed to decode record")?;
            Ok(serde_json::to_string_pretty(&order)?)
        }
        Commands::Classify { record } => {
            let order = format.decode(record).context("failed to decode record")?;
            Ok(classify(&order))
        }
        Commands::Layout => Ok(layout()),
    }
}

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("running {:?}", cli.command);
    let output = execute(&cli)?;
    println!("{}", output);
    Ok(())
}
