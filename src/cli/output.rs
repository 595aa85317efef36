//! Console formatting for command results

use qrcode::render::unicode;
use qrcode::QrCode;

use crate::wallet::nft_ops::AddressRow;
use crate::wallet::sync_ops::TokenBalance;
use crate::wallet::token_ops::BroadcastResult;
use crate::wallet::wallet_ops::WalletSummary;

/// Terminal QR code for an address or key, or None if the data does not fit
pub fn qr_code(data: &str) -> Option<String> {
    let code = QrCode::new(data.as_bytes()).ok()?;
    Some(code.render::<unicode::Dense1x2>().quiet_zone(true).build())
}

fn border(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(*width));
        line.push('+');
    }
    line
}

fn row(widths: &[usize], cells: &[String]) -> String {
    let mut line = String::from("|");
    for (width, cell) in widths.iter().zip(cells) {
        let inner = width.saturating_sub(2);
        let mut text: String = cell.chars().take(inner).collect();
        if cell.chars().count() > inner && inner > 0 {
            text.pop();
            text.push('…');
        }
        line.push_str(&format!(" {:<inner$} |", text, inner = inner));
    }
    line
}

/// Fixed-width boxed table; cells wider than their column are cut
pub fn table(headers: &[&str], widths: &[usize], rows: &[Vec<String>]) -> String {
    let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut lines = vec![border(widths), row(widths, &headers), border(widths)];
    for cells in rows {
        lines.push(row(widths, cells));
    }
    lines.push(border(widths));
    lines.join("\n")
}

pub fn wallets_table(wallets: &[WalletSummary]) -> String {
    let rows: Vec<Vec<String>> = wallets
        .iter()
        .map(|w| vec![w.name.clone(), w.network.to_string(), w.balance.to_string()])
        .collect();
    table(&["Name", "Network", "Balance (BCH)"], &[25, 15, 15], &rows)
}

pub fn addresses_table(rows: &[AddressRow]) -> String {
    let width = rows
        .iter()
        .map(|r| r.address.chars().count() + 2)
        .max()
        .unwrap_or(0)
        .max(14);
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.index.to_string(),
                r.address.clone(),
                if r.has_tokens { "yes" } else { "no" }.to_string(),
                r.balance.to_string(),
            ]
        })
        .collect();
    table(
        &["index", "Address", "Have SLP tokens?", "BCH Balance"],
        &[7, width, 18, 15],
        &rows,
    )
}

/// `ticker balance tokenId` lines under a heading. Empty when the wallet
/// holds no tokens.
pub fn token_summary(tokens: &[TokenBalance]) -> String {
    if tokens.is_empty() {
        return String::new();
    }
    let mut lines = vec![
        " ".to_string(),
        "SLP Token Summary:".to_string(),
        "Ticker Balance TokenID".to_string(),
    ];
    for token in tokens {
        lines.push(format!(
            "{} {} {}",
            token.ticker,
            token.display_balance(),
            token.token_id
        ));
    }
    lines.push(" ".to_string());
    lines.join("\n")
}

pub fn broadcast_summary(result: &BroadcastResult) -> String {
    format!(
        "hex: {}\n\nTransaction ID: {}\nView on the block explorer: {}",
        result.hex,
        result.txid,
        result.explorer_url()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bch::Network;

    #[test]
    fn test_wallets_table_layout() {
        let out = wallets_table(&[WalletSummary {
            name: "alice".into(),
            network: Network::Testnet,
            balance: 0.0001,
        }]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("Balance (BCH)"));
        assert!(lines[3].starts_with("| alice"));
        assert!(lines[3].contains("testnet"));
        assert_eq!(lines[0].chars().count(), 25 + 15 + 15 + 4);
    }

    #[test]
    fn test_token_summary_lines() {
        let out = token_summary(&[TokenBalance {
            token_id: "a4fb".into(),
            ticker: "PSID".into(),
            decimals: 8,
            units: 98_360_000_000,
        }]);
        assert!(out.contains("SLP Token Summary:"));
        assert!(out.contains("PSID 983.6 a4fb"));
        assert!(token_summary(&[]).is_empty());
    }

    #[test]
    fn test_addresses_table_flags() {
        let out = addresses_table(&[AddressRow {
            index: 0,
            address: "bitcoincash:qrpkufwnfdzp8cnxzer8d8fkhqmh0zyphq6u3gx6e3".into(),
            has_tokens: true,
            balance: 0.5,
        }]);
        assert!(out.contains("| yes"));
        assert!(out.contains("bitcoincash:qrpkufwnfdzp8cnxzer8d8fkhqmh0zyphq6u3gx6e3"));
    }

    #[test]
    fn test_qr_code_renders() {
        let qr = qr_code("bitcoincash:qrpkufwnfdzp8cnxzer8d8fkhqmh0zyphq6u3gx6e3").unwrap();
        assert!(qr.lines().count() > 10);
    }
}
