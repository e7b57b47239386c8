use crate::{
    lang::Language,
    log_internal,
    settings::StorePaths,
    store::{ConfigFile, DefaultPolicy, Result, Snapshot},
    tags::Tags,
    template::Expander,
};

/// The three documents the bot runs on
pub struct Stores {
    /// Guild layout: `roles`, `channels`, feature settings
    pub config: ConfigFile,
    pub language: ConfigFile,
    pub tags: ConfigFile,
}

impl Stores {
    pub async fn open(paths: &StorePaths) -> Result<Self> {
        Ok(Self {
            config: ConfigFile::open(&paths.config, DefaultPolicy::Raise).await?,
            language: ConfigFile::open(&paths.language, DefaultPolicy::Identity).await?,
            tags: ConfigFile::open(&paths.tags, DefaultPolicy::Empty).await?,
        })
    }

    pub fn expander(&self) -> Expander<'_> {
        Expander::new(&self.config, self.tags())
    }

    pub fn tags(&self) -> Tags<'_> {
        Tags::new(&self.tags)
    }

    pub fn lang(&self) -> Language<'_> {
        Language::new(&self.language)
    }

    /// Re-read every store from disk.  Either all of them are replaced or none is.
    pub async fn reload(&mut self) -> Result<()> {
        let mut config = self.config.begin_change();
        let mut language = self.language.begin_change();
        let mut tags = self.tags.begin_change();

        config.reload().await?;
        language.reload().await?;
        tags.reload().await?;

        config.commit();
        language.commit();
        tags.commit();
        Ok(())
    }

    /// Persist pending changes before the bot exits.
    pub async fn shutdown(&mut self) -> Result<()> {
        for store in [&mut self.config, &mut self.language, &mut self.tags] {
            store.save().await?;
        }
        log_internal!("Stores saved");
        Ok(())
    }
}
