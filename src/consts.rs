//! Общие константы (файлы состояния, дефолты retention, формат имён).

// -------- State files (в config-dir) --------
pub const STATE_FILE: &str = "snapkeep.toml";
pub const STATE_TMP_SUFFIX: &str = "tmp";
pub const STATE_BAK_SUFFIX: &str = "bak";
pub const DEFAULTS_FILE: &str = "snapkeep-default.toml";
pub const LOCK_FILE: &str = "snapkeep.lock";

// Версия формата state-файла. Несовпадение при загрузке — ошибка State,
// молча мигрировать нельзя.
pub const STATE_VERSION: u32 = 1;

pub const DEFAULT_CONFIG_DIR: &str = "/etc/conf.d";

// -------- Snapshot layout --------
// Контейнер снапшотов внутри сабволюма: <path>/.snapshots/<name>-<timestamp>.
pub const SNAPSHOT_DIR_NAME: &str = ".snapshots";

// Имя снапшота: {subvolume}-{timestamp}, таймштамп локальный, секундное
// разрешение. Повтор в пределах секунды — DuplicateName, не перезапись.
pub const SNAPSHOT_TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// -------- Retention defaults --------
// Встроенные значения на случай отсутствия snapkeep-default.toml.
pub const DEFAULT_KEEP_HOURLY: u32 = 10;
pub const DEFAULT_KEEP_DAILY: u32 = 10;
pub const DEFAULT_KEEP_WEEKLY: u32 = 0;
pub const DEFAULT_KEEP_MONTHLY: u32 = 10;
pub const DEFAULT_KEEP_YEARLY: u32 = 10;

// Минимальный интервал между взятиями снапшота в рамках rotate (часов).
// Вызов раньше срока — идемпотентный skip, не ошибка.
pub const MIN_TAKE_INTERVAL_HOURS: i64 = 1;

// -------- Backend --------
// Таймаут на одиночный вызов btrfs (take/delete). Истечение — BackendUnavailable,
// исход операции на диске считается неразрешённым.
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 60;
