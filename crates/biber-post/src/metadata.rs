//! Post metadata header.

use biber_renderer::split_escaped;

use crate::date::PostDate;
use crate::error::PostError;

/// Separator of list values such as `categories`.
const LIST_SEPARATOR: char = ',';

/// Metadata of one post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub author: String,
    pub date: PostDate,
    /// Upper-cased category names.
    pub categories: Vec<String>,
    pub title: String,
    /// Signature files, relative to the post.
    pub sign: Vec<String>,
    /// Files offered for download, relative to the post.
    pub attachment: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Key {
    Author,
    Date,
    Categories,
    Title,
    Sign,
    Attachment,
}

impl Key {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "author" => Some(Self::Author),
            "date" => Some(Self::Date),
            "categories" => Some(Self::Categories),
            "title" => Some(Self::Title),
            "sign" => Some(Self::Sign),
            "attachment" => Some(Self::Attachment),
            _ => None,
        }
    }
}

/// Metadata collected line by line.
#[derive(Default)]
pub(crate) struct MetadataBuilder {
    author: Option<String>,
    date: Option<PostDate>,
    categories: Option<Vec<String>>,
    title: Option<String>,
    sign: Option<Vec<String>>,
    attachment: Option<Vec<String>>,
}

impl MetadataBuilder {
    /// Add one `key: value` header line.
    pub(crate) fn line(&mut self, line: usize, content: &str) -> Result<(), PostError> {
        let Some((key, value)) = content.split_once(':') else {
            return Err(PostError::InvalidLine {
                line,
                content: content.to_owned(),
            });
        };
        let name = key.trim();
        let value = value.trim();
        let key = Key::parse(name).ok_or_else(|| PostError::UnknownKey {
            line,
            key: name.to_owned(),
        })?;

        let duplicate = match key {
            Key::Author => self.author.is_some(),
            Key::Date => self.date.is_some(),
            Key::Categories => self.categories.is_some(),
            Key::Title => self.title.is_some(),
            Key::Sign => self.sign.is_some(),
            Key::Attachment => self.attachment.is_some(),
        };
        if duplicate {
            return Err(PostError::DuplicateKey {
                line,
                key: name.to_owned(),
            });
        }

        let text = || {
            if value.is_empty() {
                Err(PostError::EmptyValue {
                    line,
                    key: name.to_owned(),
                })
            } else {
                Ok(value.to_owned())
            }
        };
        let list = || {
            split_escaped(value, LIST_SEPARATOR, &[]).map_err(|source| PostError::InvalidList {
                line,
                key: name.to_owned(),
                source,
            })
        };

        match key {
            Key::Author => self.author = Some(text()?),
            Key::Title => self.title = Some(text()?),
            Key::Date => {
                let date = value
                    .parse()
                    .map_err(|source| PostError::InvalidDate { line, source })?;
                self.date = Some(date);
            }
            Key::Categories => {
                let categories = list()?.iter().map(|c| c.to_uppercase()).collect();
                self.categories = Some(categories);
            }
            Key::Sign => self.sign = Some(list()?),
            Key::Attachment => self.attachment = Some(list()?),
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<Metadata, PostError> {
        Ok(Metadata {
            author: self.author.ok_or(PostError::MissingKey("author"))?,
            date: self.date.ok_or(PostError::MissingKey("date"))?,
            categories: self.categories.ok_or(PostError::MissingKey("categories"))?,
            title: self.title.ok_or(PostError::MissingKey("title"))?,
            sign: self.sign.unwrap_or_default(),
            attachment: self.attachment.unwrap_or_default(),
        })
    }
}
