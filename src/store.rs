use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

// ============================================================================
// DATA MODEL
// ============================================================================

/// Customer account, keyed by username. Read-only in the query flow.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UserAccount {
    pub username: String,
    pub account_number: String,
    pub balance: f64,
}

impl UserAccount {
    pub fn new(username: &str, account_number: &str, balance: f64) -> Self {
        Self {
            username: username.to_string(),
            account_number: account_number.to_string(),
            balance,
        }
    }
}

/// Knowledge entry matched by keyword overlap.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Faq {
    #[serde(default)]
    pub id: i64,

    /// Optional label shown in listings; never used for matching
    #[serde(default)]
    pub question: Option<String>,

    /// Comma-separated lowercase terms
    pub keywords: String,

    pub answer: String,
}

/// Row counts reported by `GET /api/stats`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub total_faqs: i64,
    pub total_users: i64,
}

// ============================================================================
// REPOSITORY INTERFACE
// ============================================================================

/// Read capabilities the query processor needs from a backing store.
pub trait KnowledgeStore: Send + Sync {
    /// Exact-match lookup by username.
    fn find_account(&self, username: &str) -> Result<Option<UserAccount>>;

    /// Every FAQ, in insertion order.
    fn list_faqs(&self) -> Result<Vec<Faq>>;

    fn count_faqs(&self) -> Result<i64>;

    fn count_accounts(&self) -> Result<i64>;

    fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            total_faqs: self.count_faqs()?,
            total_users: self.count_accounts()?,
        })
    }
}

// ============================================================================
// SQLITE STORE
// ============================================================================

pub struct SqliteStore {
    conn: Mutex<Connection>,
    in_memory: bool,
}

/// Rows inserted by `SqliteStore::seed_demo_data`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub accounts: usize,
    pub faqs: usize,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {:?}", path))?;
        debug!(path = %path.display(), "opened sqlite database");
        Ok(Self {
            conn: Mutex::new(conn),
            in_memory: false,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Ok(Self {
            conn: Mutex::new(conn),
            in_memory: true,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }

    /// Create tables and indexes. Must run once before the store is queried.
    pub fn setup(&self) -> Result<()> {
        let conn = self.conn()?;

        // WAL only applies to file databases; SQLite keeps :memory: in "memory" mode
        if !self.in_memory {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }

        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                account_number TEXT NOT NULL,
                balance REAL NOT NULL DEFAULT 0
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS faqs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT,
                keywords TEXT NOT NULL,
                answer TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_user_accounts_username ON user_accounts(username)",
            [],
        )?;

        info!("database schema ready");
        Ok(())
    }

    /// Insert or update an account, keyed by username.
    pub fn insert_account(&self, account: &UserAccount) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO user_accounts (username, account_number, balance)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(username) DO UPDATE SET
                account_number = excluded.account_number,
                balance = excluded.balance",
            params![account.username, account.account_number, account.balance],
        )
        .with_context(|| format!("Failed to insert account {}", account.username))?;
        Ok(())
    }

    /// Insert a FAQ and return its new id. The `id` field of `faq` is ignored.
    pub fn insert_faq(&self, faq: &Faq) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO faqs (question, keywords, answer) VALUES (?1, ?2, ?3)",
            params![faq.question, faq.keywords, faq.answer],
        )
        .context("Failed to insert faq")?;
        Ok(conn.last_insert_rowid())
    }

    /// Fill empty tables with demo accounts and FAQs. Tables that already
    /// hold rows are left alone, so running this twice inserts nothing.
    pub fn seed_demo_data(&self) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        if self.count_accounts()? == 0 {
            for account in demo_accounts() {
                self.insert_account(&account)?;
                report.accounts += 1;
            }
        }

        if self.count_faqs()? == 0 {
            for faq in demo_faqs() {
                self.insert_faq(&faq)?;
                report.faqs += 1;
            }
        }

        info!(accounts = report.accounts, faqs = report.faqs, "demo data seeded");
        Ok(report)
    }

    /// Import accounts from a CSV with `username,account_number,balance` headers.
    pub fn import_accounts_csv(&self, csv_path: &Path) -> Result<usize> {
        let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open CSV file")?;

        let mut imported = 0;
        for result in rdr.deserialize() {
            let account: UserAccount = result.context("Failed to deserialize account")?;
            self.insert_account(&account)?;
            imported += 1;
        }

        info!(imported, path = %csv_path.display(), "accounts imported");
        Ok(imported)
    }

    /// Import FAQs from a CSV with `keywords,answer` headers and an optional
    /// `question` column.
    pub fn import_faqs_csv(&self, csv_path: &Path) -> Result<usize> {
        let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open CSV file")?;

        let mut imported = 0;
        for result in rdr.deserialize() {
            let faq: Faq = result.context("Failed to deserialize faq")?;
            self.insert_faq(&faq)?;
            imported += 1;
        }

        info!(imported, path = %csv_path.display(), "faqs imported");
        Ok(imported)
    }
}

impl KnowledgeStore for SqliteStore {
    fn find_account(&self, username: &str) -> Result<Option<UserAccount>> {
        let conn = self.conn()?;
        let account = conn
            .query_row(
                "SELECT username, account_number, balance
                 FROM user_accounts WHERE username = ?1 LIMIT 1",
                params![username],
                |row| {
                    Ok(UserAccount {
                        username: row.get(0)?,
                        account_number: row.get(1)?,
                        balance: row.get(2)?,
                    })
                },
            )
            .optional()
            .with_context(|| format!("Failed to look up account {}", username))?;
        Ok(account)
    }

    fn list_faqs(&self) -> Result<Vec<Faq>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, question, keywords, answer FROM faqs ORDER BY id")?;

        let faqs = stmt
            .query_map([], |row| {
                Ok(Faq {
                    id: row.get(0)?,
                    question: row.get(1)?,
                    keywords: row.get(2)?,
                    answer: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load faqs")?;

        Ok(faqs)
    }

    fn count_faqs(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM faqs", [], |row| row.get(0))?;
        Ok(count)
    }

    fn count_accounts(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM user_accounts", [], |row| row.get(0))?;
        Ok(count)
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Vector-backed store for tests and offline runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    accounts: Vec<UserAccount>,
    faqs: Vec<Faq>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the same demo rows `seed_demo_data` writes.
    pub fn with_demo_data() -> Self {
        demo_faqs()
            .into_iter()
            .fold(Self::new(), |store, faq| store.with_faq(faq))
            .with_accounts(demo_accounts())
    }

    pub fn with_account(mut self, account: UserAccount) -> Self {
        self.accounts.retain(|a| a.username != account.username);
        self.accounts.push(account);
        self
    }

    fn with_accounts(self, accounts: Vec<UserAccount>) -> Self {
        accounts
            .into_iter()
            .fold(self, |store, account| store.with_account(account))
    }

    /// Append a FAQ, assigning the next sequential id.
    pub fn with_faq(mut self, mut faq: Faq) -> Self {
        faq.id = self.faqs.len() as i64 + 1;
        self.faqs.push(faq);
        self
    }
}

impl KnowledgeStore for MemoryStore {
    fn find_account(&self, username: &str) -> Result<Option<UserAccount>> {
        Ok(self
            .accounts
            .iter()
            .find(|account| account.username == username)
            .cloned())
    }

    fn list_faqs(&self) -> Result<Vec<Faq>> {
        Ok(self.faqs.clone())
    }

    fn count_faqs(&self) -> Result<i64> {
        Ok(self.faqs.len() as i64)
    }

    fn count_accounts(&self) -> Result<i64> {
        Ok(self.accounts.len() as i64)
    }
}

// ============================================================================
// DEMO DATA
// ============================================================================

pub fn demo_accounts() -> Vec<UserAccount> {
    vec![
        UserAccount::new("demo_user", "ACC-1001", 1250.75),
        UserAccount::new("john_doe", "ACC-1002", 5430.20),
        UserAccount::new("jane_smith", "ACC-1003", 89.5),
    ]
}

pub fn demo_faqs() -> Vec<Faq> {
    let entry = |question: &str, keywords: &str, answer: &str| Faq {
        id: 0,
        question: Some(question.to_string()),
        keywords: keywords.to_string(),
        answer: answer.to_string(),
    };

    vec![
        entry(
            "How long does shipping take?",
            "shipping,delivery,ship,arrive",
            "Standard shipping takes 3-5 business days. Express shipping delivers within 1-2 business days.",
        ),
        entry(
            "What is your refund policy?",
            "refund,return,money back",
            "You can request a full refund within 30 days of purchase. Refunds are issued to the original payment method.",
        ),
        entry(
            "How do I cancel my account?",
            "cancel,cancellation,close account,delete account",
            "You can cancel at any time from the Account Settings page. Your data is kept for 30 days after cancellation.",
        ),
        entry(
            "Is my data secure?",
            "security,secure,privacy,data,encrypt",
            "All data is encrypted in transit and at rest. We never share your personal information with third parties.",
        ),
        entry(
            "Where are you located?",
            "location,address,office,located",
            "Our headquarters are at 100 Main Street, Springfield. We also have offices in Austin and Denver.",
        ),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
