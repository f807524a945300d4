/// 技术指标计算
/// 快照所需的 EMA / MACD / RSI，全部为无状态函数

/// 指数移动平均序列，首值作为种子
pub fn ema_series(prices: &[f64], period: usize) -> Vec<f64> {
    if prices.is_empty() || period == 0 {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut series = Vec::with_capacity(prices.len());
    let mut ema = prices[0];
    series.push(ema);

    for price in prices.iter().skip(1) {
        ema = (price - ema) * multiplier + ema;
        series.push(ema);
    }

    series
}

/// 计算指数移动平均线 (EMA)
pub fn ema(prices: &[f64], period: usize) -> Option<f64> {
    ema_series(prices, period).last().copied()
}

/// 计算MACD指标，返回 (MACD线, 信号线, 柱状图)
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> Option<(f64, f64, f64)> {
    if fast == 0 || slow <= fast || signal == 0 || prices.len() < slow + signal - 1 {
        return None;
    }

    let fast_series = ema_series(prices, fast);
    let slow_series = ema_series(prices, slow);

    // 慢线预热完成后才开始计算信号线
    let macd_series: Vec<f64> = fast_series
        .iter()
        .zip(slow_series.iter())
        .skip(slow - 1)
        .map(|(f, s)| f - s)
        .collect();

    let macd_line = *macd_series.last()?;
    let signal_line = ema(&macd_series, signal)?;

    Some((macd_line, signal_line, macd_line - signal_line))
}

/// 计算相对强弱指数 (RSI)，Wilder平滑
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = changes[..period].iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
    let mut avg_loss =
        changes[..period].iter().filter(|c| **c < 0.0).map(|c| -c).sum::<f64>() / period as f64;

    for change in &changes[period..] {
        let gain = if *change > 0.0 { *change } else { 0.0 };
        let loss = if *change < 0.0 { -change } else { 0.0 };
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return Some(50.0);
        }
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
