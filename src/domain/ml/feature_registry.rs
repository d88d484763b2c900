/// Group A: momentum, volatility and trend from daily OHLCV.
pub const GROUP_A_MARKET: &[&str] = &[
    "ret_1d",
    "ret_5d",
    "ret_21d",
    "vol_5d",
    "vol_21d",
    "high_low_range",
    "close_vs_ma21",
    "close_vs_ma63",
];

/// Group B: oscillators.
pub const GROUP_B_TECHNICAL: &[&str] = &["RSI_14", "ATR_14_pct", "BB_width"];

/// Group C: lagged news sentiment.
pub const GROUP_C_SENTIMENT: &[&str] = &[
    "sentiment_lag_1",
    "sentiment_lag_3",
    "sentiment_lag_7",
    "sentiment_7d_avg_lag1",
    "buzz_7d_lag1",
    "sentiment_decay_lag1",
];

/// Group D: one-quarter lagged macro plus daily FX context.
pub const GROUP_D_MACRO: &[&str] = &["GDP_t_1Q", "INF_t_1Q", "DC_t_1Q", "fx_ret_5d", "fx_vol_21d"];

/// Group E: per-bank standardized fundamentals.
pub const GROUP_E_BANK: &[&str] = &[
    "ROE_z",
    "ROA_z",
    "P_B_z",
    "LDR_z",
    "CIR_z",
    "Assets_Equity_z",
];

/// Canonical feature order. Models are trained on this order filtered down to
/// the columns a run actually produced; any change here changes artifacts.
pub fn feature_names() -> Vec<&'static str> {
    [
        GROUP_A_MARKET,
        GROUP_B_TECHNICAL,
        GROUP_C_SENTIMENT,
        GROUP_D_MACRO,
        GROUP_E_BANK,
    ]
    .concat()
}

/// Canonical-order subset of `available`.
pub fn present_features(available: &[String]) -> Vec<String> {
    feature_names()
        .into_iter()
        .filter(|name| available.iter().any(|a| a == name))
        .map(str::to_string)
        .collect()
}
