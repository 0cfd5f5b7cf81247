// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for whatever front end drives a conversion.
//
// Every technical error is mapped to a plain sentence with a suggestion. The
// severity drives how a UI presents it.

use crate::error::ConvertError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Disk full or file locked. Trying again may work.
    Transient,
    /// The user must change something (pick other files, another folder).
    ActionRequired,
    /// Cannot be fixed by retrying, e.g. a broken image.
    Permanent,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether running the same conversion again could succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `ConvertError` into something that can be shown to a user as-is.
pub fn humanize_error(err: &ConvertError) -> HumanError {
    match err {
        ConvertError::Input(detail) => {
            if detail.contains("no images") {
                HumanError {
                    message: "No images were selected.".into(),
                    suggestion: "Add at least one image, then convert again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "One of the selected files can't be used.".into(),
                    suggestion: format!(
                        "It may have been moved or deleted. Choose the files again. ({detail})"
                    ),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            }
        }

        ConvertError::Decode(detail) => HumanError {
            message: "One of the images couldn't be read.".into(),
            suggestion: format!(
                "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first. ({detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        ConvertError::Convert(_) => HumanError {
            message: "The colours of an image couldn't be converted for print.".into(),
            suggestion: "Try exporting the image again as a regular RGB JPEG or PNG.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ConvertError::Encode(_) => HumanError {
            message: "An image couldn't be compressed for the PDF.".into(),
            suggestion: "Very large images are not supported. Try a smaller version of the image.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ConvertError::Assemble(_) => HumanError {
            message: "The page size couldn't be worked out.".into(),
            suggestion: "Enter a page width and height, or make sure the first image opens correctly.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ConvertError::Serialize(_) => HumanError {
            message: "The PDF couldn't be created.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Permanent,
        },

        ConvertError::Write(_) => HumanError {
            message: "The PDF couldn't be saved.".into(),
            suggestion: "Check that the output folder exists, that you can write to it, and that the disk isn't full.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        ConvertError::Report(_) => HumanError {
            message: "The result couldn't be displayed.".into(),
            suggestion: "Run the command again without --json. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Permanent,
        },

        ConvertError::Config(_) | ConvertError::Serialization(_) => HumanError {
            message: "The settings file is invalid.".into(),
            suggestion: "Fix or remove the settings file and try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
