use clap::{Arg, Command};
use merabot::{
    bot::{BotContext, FacadeLogger, HttpPredictor, MeraBot},
    core::config::{ApiKeys, BotSettings},
    exchanges::BinanceAdapter,
    utils::{init_logger, write_default_config},
};
use std::sync::Arc;
use std::time::Duration;

fn cli() -> Command {
    Command::new("MeraBot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("EMA/MACD/RSI 趋势反转交易机器人")
        .subcommand_required(true)
        .subcommand(
            Command::new("run").about("启动交易主循环").arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("配置文件路径，缺省时只使用默认值与环境变量"),
            ),
        )
        .subcommand(
            Command::new("init-config").about("写出默认配置文件").arg(
                Arg::new("path")
                    .value_name("FILE")
                    .default_value("config/merabot.yml")
                    .help("输出路径"),
            ),
        )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("run", args)) => {
            let config_path = args.get_one::<String>("config").map(String::as_str);
            run(config_path).await
        }
        Some(("init-config", args)) => {
            let path = args
                .get_one::<String>("path")
                .map(String::as_str)
                .unwrap_or("config/merabot.yml");
            write_default_config(path)?;
            println!("✅ 默认配置已写入 {}", path);
            Ok(())
        }
        _ => unreachable!("subcommand_required"),
    }
}

async fn run(config_path: Option<&str>) -> anyhow::Result<()> {
    let settings = BotSettings::load(config_path)?;
    init_logger(&settings.log)?;

    log::info!(
        "启动 MeraBot: {} {}，配置文件: {}",
        settings.exchange.symbol,
        settings.exchange.interval,
        config_path.unwrap_or("<默认>")
    );

    let call_timeout = Duration::from_secs(settings.call_timeout_secs);
    let api_keys = ApiKeys::from_env("BINANCE")?;
    let exchange = BinanceAdapter::new(settings.exchange.clone(), api_keys, call_timeout)?;
    let predictor = HttpPredictor::new(settings.predictor.endpoint.clone(), call_timeout)?;

    let ctx = BotContext::new(
        Arc::new(exchange),
        Arc::new(predictor),
        Arc::new(FacadeLogger),
        call_timeout,
    );
    let mut bot = MeraBot::new(ctx, &settings).await?;

    tokio::select! {
        _ = bot.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            log::info!("🛑 收到退出信号，停止运行");
        }
    }

    log::info!("{}", bot.context().performance_tracker);
    Ok(())
}
