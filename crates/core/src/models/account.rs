use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::CoreError;

/// Investment horizon of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    #[serde(rename = "Short Term")]
    ShortTerm,
    #[serde(rename = "Long Term")]
    LongTerm,
}

/// Whether an account holds something you own or something you owe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountType {
    Asset,
    Liability,
}

/// Liquidity bucket used by the portfolio breakdown page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Portfolio {
    Liquid,
    Illiquid,
    #[serde(rename = "Cash Reserves")]
    CashReserves,
}

impl Portfolio {
    pub const ALL: [Portfolio; 3] = [
        Portfolio::Liquid,
        Portfolio::Illiquid,
        Portfolio::CashReserves,
    ];
}

/// Asset class of an account, stacked in the portfolio breakdown chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetClass {
    Cash,
    Equities,
    Crypto,
    #[serde(rename = "Real Estate")]
    RealEstate,
}

impl Term {
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::ShortTerm => "Short Term",
            Term::LongTerm => "Long Term",
        }
    }
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "Asset",
            AccountType::Liability => "Liability",
        }
    }
}

impl Portfolio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Portfolio::Liquid => "Liquid",
            Portfolio::Illiquid => "Illiquid",
            Portfolio::CashReserves => "Cash Reserves",
        }
    }
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Cash => "Cash",
            AssetClass::Equities => "Equities",
            AssetClass::Crypto => "Crypto",
            AssetClass::RealEstate => "Real Estate",
        }
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {
        $(
            impl std::fmt::Display for $t {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(Term, AccountType, Portfolio, AssetClass);

/// The independent axes an account is classified along.
///
/// Filters combine labels with AND across dimensions and OR within one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Type,
    Term,
    Portfolio,
    AssetClass,
}

/// A single classification label, tagged with the dimension it belongs to.
///
/// This is the "tag" view of an account: `Account::classifications()` turns the
/// discrete fields into a set of labels, and a filter is a set of labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Classification {
    Type(AccountType),
    Term(Term),
    Portfolio(Portfolio),
    AssetClass(AssetClass),
}

impl Classification {
    /// Every label the dashboard knows about, in display order.
    pub const ALL: [Classification; 11] = [
        Classification::Type(AccountType::Asset),
        Classification::Type(AccountType::Liability),
        Classification::Term(Term::ShortTerm),
        Classification::Term(Term::LongTerm),
        Classification::Portfolio(Portfolio::Liquid),
        Classification::Portfolio(Portfolio::Illiquid),
        Classification::Portfolio(Portfolio::CashReserves),
        Classification::AssetClass(AssetClass::Cash),
        Classification::AssetClass(AssetClass::Equities),
        Classification::AssetClass(AssetClass::Crypto),
        Classification::AssetClass(AssetClass::RealEstate),
    ];

    pub fn dimension(&self) -> Dimension {
        match self {
            Classification::Type(_) => Dimension::Type,
            Classification::Term(_) => Dimension::Term,
            Classification::Portfolio(_) => Dimension::Portfolio,
            Classification::AssetClass(_) => Dimension::AssetClass,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Type(t) => t.as_str(),
            Classification::Term(t) => t.as_str(),
            Classification::Portfolio(p) => p.as_str(),
            Classification::AssetClass(c) => c.as_str(),
        }
    }

    /// Parse a label by its display string (case-sensitive, e.g. `"Short Term"`).
    pub fn parse(label: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == label)
            .ok_or_else(|| CoreError::Validation(format!("Unknown classification label '{label}'")))
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Classification {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Classification::parse(&value)
    }
}

impl From<Classification> for String {
    fn from(value: Classification) -> Self {
        value.as_str().to_string()
    }
}

/// A named, classified financial holding or obligation.
///
/// `name` is the external key used by the API (there is no surrogate ID on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub term: Option<Term>,

    #[serde(rename = "type", default)]
    pub account_type: Option<AccountType>,

    #[serde(default)]
    pub portfolio: Option<Portfolio>,

    #[serde(default)]
    pub asset_class: Option<AssetClass>,
}

impl Account {
    /// An unclassified account with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            term: None,
            account_type: None,
            portfolio: None,
            asset_class: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_type(mut self, account_type: AccountType) -> Self {
        self.account_type = Some(account_type);
        self
    }

    pub fn with_term(mut self, term: Term) -> Self {
        self.term = Some(term);
        self
    }

    pub fn with_portfolio(mut self, portfolio: Portfolio) -> Self {
        self.portfolio = Some(portfolio);
        self
    }

    pub fn with_asset_class(mut self, asset_class: AssetClass) -> Self {
        self.asset_class = Some(asset_class);
        self
    }

    /// The account's labels, one per classified dimension.
    pub fn classifications(&self) -> Vec<Classification> {
        let mut labels = Vec::with_capacity(4);
        if let Some(t) = self.account_type {
            labels.push(Classification::Type(t));
        }
        if let Some(t) = self.term {
            labels.push(Classification::Term(t));
        }
        if let Some(p) = self.portfolio {
            labels.push(Classification::Portfolio(p));
        }
        if let Some(c) = self.asset_class {
            labels.push(Classification::AssetClass(c));
        }
        labels
    }

    /// The account's label for one dimension, if it has one.
    pub fn classification_in(&self, dimension: Dimension) -> Option<Classification> {
        match dimension {
            Dimension::Type => self.account_type.map(Classification::Type),
            Dimension::Term => self.term.map(Classification::Term),
            Dimension::Portfolio => self.portfolio.map(Classification::Portfolio),
            Dimension::AssetClass => self.asset_class.map(Classification::AssetClass),
        }
    }
}

/// Payload shape for creating an account. Not submitted by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub term: Option<Term>,
    #[serde(rename = "type", default)]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub portfolio: Option<Portfolio>,
    #[serde(default)]
    pub asset_class: Option<AssetClass>,
}

impl From<&Account> for AccountCreate {
    fn from(account: &Account) -> Self {
        Self {
            name: account.name.clone(),
            description: account.description.clone(),
            term: account.term,
            account_type: account.account_type,
            portfolio: account.portfolio,
            asset_class: account.asset_class,
        }
    }
}

/// Check the catalog invariants: names are non-empty and unique (case-sensitive).
pub fn validate_catalog(accounts: &[Account]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(accounts.len());
    for account in accounts {
        if account.name.trim().is_empty() {
            return Err(CoreError::Validation("Account name must not be empty".into()));
        }
        if !seen.insert(account.name.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate account name '{}'",
                account.name
            )));
        }
    }
    Ok(())
}
