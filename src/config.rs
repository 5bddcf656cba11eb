use std::convert::TryInto;
use std::ffi::OsStr;
use std::fs::File;

use justconfig::error::ConfigError;
use justconfig::item::{MapAction, StringItem, ValueExtractor};
use justconfig::processors::Trim;
use justconfig::sources::env::Env;
use justconfig::sources::text::ConfigText;
use justconfig::ConfPath;
use justconfig::Config;

// Set some default values
const DEFAULT_NEIGHBORHOOD_SIZE_K: usize = 100;
const DEFAULT_SAMPLE_SIZE_M: usize = 1000;
const DEFAULT_IDF_WEIGHT: f64 = 1.0;
const DEFAULT_NUM_ITEMS_TO_RECOMMEND: usize = 20;
const DEFAULT_MAX_ITEMS_IN_SESSION: usize = 10;

pub struct AppConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    pub hyperparam: HyperparamConfig,
}

pub struct ServerConfig {
    pub host: String,
    pub port: usize,
    pub num_workers: usize,
}

pub struct LogConfig {
    pub level: String,
}

pub struct DataConfig {
    pub training_data_path: String,
}

pub struct ModelConfig {
    pub neighborhood_size_k: usize,
    pub sample_size_m: usize,
    pub idf_weight: f64,
    pub normalize: bool,
    pub num_items_to_recommend: usize,
    pub max_items_in_session: usize,
}

pub struct HyperparamConfig {
    pub test_data_path: String,
    pub validation_data_path: String,
    pub num_iterations: usize,
    pub save_records: bool,
    pub out_path: String,
    pub neighborhood_size_k_choices: String,
    pub sample_size_m_choices: String,
    pub idf_weight_choices: String,
}

impl AppConfig {
    pub fn new(config_path: String) -> AppConfig {
        // Initialize config object
        let mut conf = Config::default();

        // Check if there is a config file
        if let Ok(config_file) = File::open(&config_path) {
            let config_text = ConfigText::new(config_file, &config_path)
                .expect("Loading configuration file failed.");
            conf.add_source(config_text);
        }

        // Define config params from environment variables
        let config_env = Env::new(&[
            (
                ConfPath::from(&["data", "training_data_path"]),
                OsStr::new("TRAINING_DATA"),
            ),
            (
                ConfPath::from(&["server", "num_workers"]),
                OsStr::new("NUM_WORKERS"),
            ),
        ]);
        conf.add_source(config_env);

        // Parse into custom config struct
        AppConfig::parse(conf)
    }

    fn parse(conf: justconfig::Config) -> AppConfig {
        AppConfig {
            server: ServerConfig::parse(&conf, ConfPath::from(&["server"])),
            log: LogConfig::parse(&conf, ConfPath::from(&["log"])),
            data: DataConfig::parse(&conf, ConfPath::from(&["data"])),
            model: ModelConfig::parse(&conf, ConfPath::from(&["model"])),
            hyperparam: HyperparamConfig::parse(&conf, ConfPath::from(&["hyperparam"])),
        }
    }
}

impl ServerConfig {
    fn parse(conf: &Config, path: ConfPath) -> ServerConfig {
        ServerConfig {
            host: conf
                .get(path.push("host"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from("0.0.0.0")),
            port: conf.get(path.push("port")).trim().value().unwrap_or(8080),
            num_workers: conf
                .get(path.push("num_workers"))
                .trim()
                .value()
                // Detect number of CPUs
                .unwrap_or_else(|_| sys_info::cpu_num().unwrap_or_default().try_into().unwrap()),
        }
    }
}

impl LogConfig {
    fn parse(conf: &Config, path: ConfPath) -> LogConfig {
        LogConfig {
            level: conf
                .get(path.push("level"))
                .unquote()
                .value()
                .unwrap_or_default(),
        }
    }
}

impl DataConfig {
    fn parse(conf: &Config, path: ConfPath) -> DataConfig {
        DataConfig {
            training_data_path: conf
                .get(path.push("training_data_path"))
                .unquote()
                .value()
                .unwrap(),
        }
    }
}

impl ModelConfig {
    fn parse(conf: &Config, path: ConfPath) -> ModelConfig {
        ModelConfig {
            neighborhood_size_k: conf
                .get(path.push("neighborhood_size_k"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_NEIGHBORHOOD_SIZE_K),
            sample_size_m: conf
                .get(path.push("sample_size_m"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_SAMPLE_SIZE_M),
            idf_weight: conf
                .get(path.push("idf_weight"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_IDF_WEIGHT),
            normalize: conf
                .get(path.push("normalize"))
                .trim()
                .value()
                .unwrap_or(true),
            num_items_to_recommend: conf
                .get(path.push("num_items_to_recommend"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_NUM_ITEMS_TO_RECOMMEND),
            max_items_in_session: conf
                .get(path.push("max_items_in_session"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_MAX_ITEMS_IN_SESSION),
        }
    }
}

impl HyperparamConfig {
    fn parse(conf: &Config, path: ConfPath) -> HyperparamConfig {
        HyperparamConfig {
            test_data_path: conf
                .get(path.push("test_data_path"))
                .unquote()
                .value()
                .unwrap_or_default(),
            validation_data_path: conf
                .get(path.push("validation_data_path"))
                .unquote()
                .value()
                .unwrap_or_default(),
            num_iterations: conf
                .get(path.push("num_iterations"))
                .trim()
                .value()
                .unwrap_or(50),
            save_records: conf
                .get(path.push("save_records"))
                .trim()
                .value()
                .unwrap_or(false),
            out_path: conf
                .get(path.push("out_path"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from("hyperparameter_search.csv")),
            neighborhood_size_k_choices: conf
                .get(path.push("neighborhood_size_k_choices"))
                .trim()
                .value()
                .unwrap_or_else(|_| String::from("50,100,500,1000")),
            sample_size_m_choices: conf
                .get(path.push("sample_size_m_choices"))
                .trim()
                .value()
                .unwrap_or_else(|_| String::from("500,1000,2500")),
            idf_weight_choices: conf
                .get(path.push("idf_weight_choices"))
                .trim()
                .value()
                .unwrap_or_else(|_| String::from("1,2,3,5")),
        }
    }
}

/// Remove quotes from configuration strings.
pub trait Unquote
where
    Self: Sized,
{
    fn unquote(self) -> Result<StringItem, ConfigError>;
}

impl Unquote for Result<StringItem, ConfigError> {
    /// Trims every configuration value and strips one pair of surrounding
    /// quotes (`"`) when present.
    ///
    /// ## Example
    ///
    /// ```rust
    /// # use justconfig::Config;
    /// # use justconfig::ConfPath;
    /// # use justconfig::item::ValueExtractor;
    /// # use justconfig::sources::defaults::Defaults;
    /// # use covisit::config::Unquote;
    /// #
    /// # let mut conf = Config::default();
    /// # let mut defaults = Defaults::default();
    /// defaults.set(conf.root().push_all(&["quoted"]), "\"abc\"", "source info");
    /// conf.add_source(defaults);
    ///
    /// let value: String = conf.get(ConfPath::from(&["quoted"])).unquote().value().unwrap();
    ///
    /// assert_eq!(value, "abc");
    /// ```
    fn unquote(self) -> Result<StringItem, ConfigError> {
        self?.map(|v| {
            let v = v.trim();

            if v.starts_with('"') && v.ends_with('"') {
                MapAction::Replace(vec![v[1..v.len() - 1].to_owned()])
            } else {
                MapAction::Keep
            }
        })
    }
}
