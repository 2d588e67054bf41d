//! Downloader (`sbstck-dl download`) argument mapping.

use super::validation::{Checks, ValidationError};
use crate::command::Command;
use crate::config::{DEFAULT_FILES_DIR, DEFAULT_IMAGES_DIR, DownloadConfig};
use crate::ports::Tool;

/// Requests per second the downloader uses when `-r` is absent.
const DEFAULT_RATE: u32 = 1;

pub fn build_download(config: &DownloadConfig) -> Result<Command, Vec<ValidationError>> {
    let mut checks = Checks::default();

    let url = checks.required("url", &config.url);
    if let Some(url) = url {
        checks.http_url("url", url);
    }

    let destination = checks.required("destination", &config.destination);
    if let Some(dest) = destination {
        checks.path("destination", dest);
    }

    let (after, before) = match &config.date_range {
        Some(range) => {
            let after = checks.date("after date", range.after.as_deref());
            let before = checks.date("before date", range.before.as_deref());
            if let (Some(a), Some(b)) = (after, before)
                && a > b
            {
                checks.push(ValidationError::DateOrder {
                    after: a.to_string(),
                    before: b.to_string(),
                });
            }
            (after, before)
        }
        None => (None, None),
    };

    let rate = checks.positive("rate limit", config.rate_limit.as_deref());

    if let Some(images) = &config.images {
        checks.path("images folder", &images.directory);
    }
    if let Some(files) = &config.attachments {
        checks.path("files folder", &files.directory);
    }

    let errors = checks.into_errors();
    let (Some(url), Some(destination)) = (url, destination) else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut cmd = Command::new(Tool::Downloader.canonical_name());
    cmd.arg("download")
        .flag_value("--url", url)
        .flag_value("-o", destination)
        .flag_value("-f", config.format.flag());

    if let Some(after) = after {
        cmd.flag_value("--after", after.format("%Y-%m-%d").to_string());
    }
    if let Some(before) = before {
        cmd.flag_value("--before", before.format("%Y-%m-%d").to_string());
    }

    if let Some(images) = &config.images {
        cmd.arg("--download-images")
            .flag_value("--image-quality", images.quality.flag());
        let dir = images.directory.trim();
        if !dir.is_empty() && dir != DEFAULT_IMAGES_DIR {
            cmd.flag_value("--images-dir", dir);
        }
    }

    if let Some(files) = &config.attachments {
        cmd.arg("--download-files");
        let exts = files.extensions.trim();
        if !exts.is_empty() {
            cmd.flag_value("--file-extensions", exts);
        }
        let dir = files.directory.trim();
        if !dir.is_empty() && dir != DEFAULT_FILES_DIR {
            cmd.flag_value("--files-dir", dir);
        }
    }

    if config.add_source_url {
        cmd.arg("--add-source-url");
    }
    if config.create_archive {
        cmd.arg("--create-archive");
    }

    if let Some(rate) = rate.filter(|r| *r != DEFAULT_RATE) {
        cmd.flag_value("-r", rate.to_string());
    }

    if config.verbose {
        cmd.arg("-v");
    }
    if config.tool_dry_run {
        cmd.arg("-d");
    }

    if let Some(value) = config.cookie_value.as_ref().filter(|v| !v.is_blank()) {
        cmd.flag_value("--cookie_name", config.cookie_name.trim())
            .arg("--cookie_val")
            .secret_arg(value);
    }

    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AttachmentOptions, ImageOptions, ImageQuality, OutputFormat, Secret};

    fn base() -> DownloadConfig {
        DownloadConfig::new("https://x.substack.com/", "/out")
    }

    #[test]
    fn minimal_download_tokens() {
        let cmd = build_download(&base()).unwrap();
        assert_eq!(
            cmd.tokens(),
            vec![
                "sbstck-dl",
                "download",
                "--url",
                "https://x.substack.com/",
                "-o",
                "/out",
                "-f",
                "md",
                "--add-source-url",
            ]
        );
    }

    #[test]
    fn full_option_mapping_in_order() {
        let config = base()
            .with_format(OutputFormat::Html)
            .with_date_range(Some("2023-01-01"), Some("2023-12-31"))
            .with_images(ImageOptions {
                quality: ImageQuality::High,
                directory: "pics".into(),
            })
            .with_attachments(AttachmentOptions {
                extensions: "pdf,docx".into(),
                directory: "files".into(),
            })
            .with_rate_limit("3")
            .with_verbose(true)
            .with_tool_dry_run(true)
            .with_cookie("substack.sid", Secret::new("cookie-value"));
        let config = DownloadConfig {
            create_archive: true,
            ..config
        };

        let cmd = build_download(&config).unwrap();
        assert_eq!(
            cmd.redacted_tokens(),
            vec![
                "sbstck-dl",
                "download",
                "--url",
                "https://x.substack.com/",
                "-o",
                "/out",
                "-f",
                "html",
                "--after",
                "2023-01-01",
                "--before",
                "2023-12-31",
                "--download-images",
                "--image-quality",
                "high",
                "--images-dir",
                "pics",
                "--download-files",
                "--file-extensions",
                "pdf,docx",
                "--add-source-url",
                "--create-archive",
                "-r",
                "3",
                "-v",
                "-d",
                "--cookie_name",
                "substack.sid",
                "--cookie_val",
                "********",
            ]
        );
        assert_eq!(cmd.tokens().last().unwrap(), "cookie-value");
    }

    #[test]
    fn default_rate_and_directories_are_omitted() {
        let config = base()
            .with_rate_limit("1")
            .with_images(ImageOptions::default());
        let tokens = build_download(&config).unwrap().tokens();
        assert!(!tokens.contains(&"-r".to_string()));
        assert!(!tokens.contains(&"--images-dir".to_string()));
    }

    #[test]
    fn blank_cookie_value_adds_nothing() {
        let config = base().with_cookie("substack.sid", Secret::new("  "));
        let tokens = build_download(&config).unwrap().tokens();
        assert!(!tokens.iter().any(|t| t.starts_with("--cookie")));
    }

    #[test]
    fn missing_destination_is_reported() {
        let errors = build_download(&DownloadConfig::new("https://x.substack.com/", "")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "destination required");
    }

    #[test]
    fn all_problems_are_collected() {
        let config = DownloadConfig::new("x.substack.com", "")
            .with_date_range(Some("2024-05-01"), Some("2024-01-01"))
            .with_rate_limit("fast");
        let errors = build_download(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidUrl {
            field: "url",
            value: "x.substack.com".into()
        }));
        assert!(errors.contains(&ValidationError::Missing {
            field: "destination"
        }));
        assert!(errors.contains(&ValidationError::DateOrder {
            after: "2024-05-01".into(),
            before: "2024-01-01".into()
        }));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidNumber {
                field: "rate limit",
                ..
            }
        )));
    }

    #[test]
    fn date_range_with_single_bound() {
        let config = base().with_date_range(None, Some("2022-06-30"));
        let tokens = build_download(&config).unwrap().tokens();
        assert!(!tokens.contains(&"--after".to_string()));
        assert!(tokens.windows(2).any(|w| w == ["--before", "2022-06-30"]));
    }
}
